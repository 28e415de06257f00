//! Decision processes shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rollout_mcts::{GameState, PlayerId, SearchTree};

/// Tic-tac-toe; player 0 plays X (1), player 1 plays O (2). A full board
/// without a line is a draw shared by both players.
#[derive(Clone, Debug)]
pub struct TicTacToe {
    pub board: [u8; 9],
    pub player: PlayerId,
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

impl TicTacToe {
    pub fn new() -> Self {
        TicTacToe {
            board: [0; 9],
            player: 0,
        }
    }

    /// X O X
    /// - X -
    /// O - O
    ///
    /// X to move and must block at 7.
    pub fn must_block() -> Self {
        TicTacToe {
            board: [1, 2, 1, 0, 1, 0, 2, 0, 2],
            player: 0,
        }
    }

    fn line_winner(&self) -> Option<PlayerId> {
        LINES.iter().find_map(|line| {
            let mark = self.board[line[0]];
            (mark != 0 && line.iter().all(|&i| self.board[i] == mark)).then(|| mark as usize - 1)
        })
    }
}

impl GameState for TicTacToe {
    type Action = usize;
    type State = ([u8; 9], PlayerId);

    fn render(&self) -> String {
        self.board
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        1 => 'X',
                        2 => 'O',
                        _ => '.',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn state(&self) -> Self::State {
        (self.board, self.player)
    }

    fn number_of_players(&self) -> usize {
        2
    }

    fn current_player(&self) -> PlayerId {
        self.player
    }

    fn possible_actions(&self) -> Vec<usize> {
        if self.has_outcome() {
            return Vec::new();
        }
        (0..9).filter(|&i| self.board[i] == 0).collect()
    }

    fn take_action(&mut self, action: &usize) {
        if self.board[*action] == 0 {
            self.board[*action] = self.player as u8 + 1;
        }
        self.player = 1 - self.player;
    }

    fn has_outcome(&self) -> bool {
        self.line_winner().is_some() || self.board.iter().all(|&c| c != 0)
    }

    fn winners(&self) -> Vec<PlayerId> {
        match self.line_winner() {
            Some(winner) => vec![winner],
            None => vec![0, 1],
        }
    }
}

/// One choice between two actions, then a fair coin decides the winner.
///
/// The coin is shared between clones so every episode draws a fresh outcome
/// while the whole run stays reproducible.
#[derive(Clone, Debug)]
pub struct CoinFlip {
    pub choice: Option<u8>,
    pub player: PlayerId,
    pub winner: Option<PlayerId>,
    pub coin: Rc<RefCell<StdRng>>,
}

impl CoinFlip {
    pub fn new(seed: u64) -> Self {
        CoinFlip {
            choice: None,
            player: 0,
            winner: None,
            coin: Rc::new(RefCell::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl GameState for CoinFlip {
    type Action = u8;
    type State = Option<u8>;

    fn render(&self) -> String {
        format!("choice {:?}, winner {:?}", self.choice, self.winner)
    }

    fn state(&self) -> Option<u8> {
        self.choice
    }

    fn number_of_players(&self) -> usize {
        2
    }

    fn current_player(&self) -> PlayerId {
        self.player
    }

    fn possible_actions(&self) -> Vec<u8> {
        vec![0, 1]
    }

    fn take_action(&mut self, action: &u8) {
        if self.choice.is_none() {
            self.choice = Some(*action);
            self.winner = Some(self.coin.borrow_mut().gen_range(0..2));
        }
        self.player = 1 - self.player;
    }

    fn has_outcome(&self) -> bool {
        self.choice.is_some()
    }

    fn winners(&self) -> Vec<PlayerId> {
        self.winner.into_iter().collect()
    }
}

/// How a [`Countdown`] ends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
    LastMoverWins,
    Draw,
    NobodyWins,
}

/// Every action counts down by one, so all actions from a position lead to
/// the same next position.
#[derive(Clone, Debug)]
pub struct Countdown {
    pub remaining: u32,
    pub branching: u32,
    pub players: usize,
    pub player: PlayerId,
    pub ending: Ending,
}

impl Countdown {
    pub fn new(remaining: u32, branching: u32, players: usize, ending: Ending) -> Self {
        Countdown {
            remaining,
            branching,
            players,
            player: 0,
            ending,
        }
    }
}

impl GameState for Countdown {
    type Action = u32;
    type State = (u32, PlayerId);

    fn render(&self) -> String {
        format!("{} left, player {} to move", self.remaining, self.player)
    }

    fn state(&self) -> Self::State {
        (self.remaining, self.player)
    }

    fn number_of_players(&self) -> usize {
        self.players
    }

    fn current_player(&self) -> PlayerId {
        self.player
    }

    fn possible_actions(&self) -> Vec<u32> {
        (0..self.branching).collect()
    }

    fn take_action(&mut self, _action: &u32) {
        self.remaining = self.remaining.saturating_sub(1);
        self.player = (self.player + 1) % self.players;
    }

    fn has_outcome(&self) -> bool {
        self.remaining == 0
    }

    fn winners(&self) -> Vec<PlayerId> {
        match self.ending {
            Ending::LastMoverWins => vec![(self.player + self.players - 1) % self.players],
            Ending::Draw => (0..self.players).collect(),
            Ending::NobodyWins => Vec::new(),
        }
    }
}

/// Offers one action, then neither ends nor offers another.
#[derive(Clone, Debug)]
pub struct Stalled {
    pub moved: bool,
}

impl GameState for Stalled {
    type Action = u8;
    type State = bool;

    fn render(&self) -> String {
        format!("moved: {}", self.moved)
    }

    fn state(&self) -> bool {
        self.moved
    }

    fn number_of_players(&self) -> usize {
        1
    }

    fn current_player(&self) -> PlayerId {
        0
    }

    fn possible_actions(&self) -> Vec<u8> {
        if self.moved {
            Vec::new()
        } else {
            vec![0]
        }
    }

    fn take_action(&mut self, _action: &u8) {
        self.moved = true;
    }

    fn has_outcome(&self) -> bool {
        false
    }

    fn winners(&self) -> Vec<PlayerId> {
        Vec::new()
    }
}

/// Visits, credit and child actions of every node, in arena order.
pub fn tree_fingerprint<K, A>(tree: &SearchTree<K, A>) -> Vec<(usize, u64, f64, Vec<A>)>
where
    K: Clone + Eq + std::hash::Hash,
    A: Clone + PartialEq,
{
    tree.iter()
        .map(|(_, node)| {
            (
                node.mover(),
                node.visits(),
                node.credit(),
                node.children().iter().map(|(a, _)| a.clone()).collect(),
            )
        })
        .collect()
}
