//! Tic-Tac-Toe example for the MCTS engine
//!
//! Trains a tree by self-play, saves it, reloads it into a fresh session and
//! then lets a human play X against the tree.
//!
//! Run with `RUST_LOG=info cargo run --example tic_tac_toe` to see progress.

use std::fmt;
use std::io::{self, Write};

use rollout_mcts::{DecisionRule, GameState, MCTSConfig, PlayerId, MCTS};

const TRAINING_EPISODES: usize = 20_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    println!("MCTS Tic-Tac-Toe Example");
    println!("========================");
    println!();

    // Train a UCT tree from the empty board
    let config = MCTSConfig::uct(1.414).with_log_interval(5_000);
    let mut trainer = MCTS::new(TicTacToe::new(), config)?;
    println!("Training for {} episodes...", TRAINING_EPISODES);
    trainer.self_play(TRAINING_EPISODES)?;
    println!("{}", trainer.get_statistics().summary());

    // Round-trip the tree through a snapshot
    let path = std::env::temp_dir().join("tic_tac_toe_tree.json");
    trainer.save(&path)?;
    let mut mcts = MCTS::new(TicTacToe::new(), MCTSConfig::uct(1.414).with_training(false))?;
    mcts.load(&path, TicTacToe::new())?;
    println!("Reloaded {} nodes from {}", mcts.tree().len(), path.display());
    println!();

    // One game of the tree against itself
    let playthrough = mcts.playthrough(DecisionRule::Best)?;
    println!(
        "Self-play game: {:?}, winners {:?}",
        playthrough.actions, playthrough.winners
    );
    println!();

    // Main game loop
    let mut game = TicTacToe::new();
    let mut cursor = mcts.cursor();
    while !game.has_outcome() {
        // Display the board
        println!("{}", game);

        let action = if game.current_player() == 0 {
            // Human player (X)
            print!("Your move (enter row column, e.g. '1 2'): ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                println!("No input, quitting.");
                return Ok(());
            }

            let coords: Vec<usize> = input
                .split_whitespace()
                .filter_map(|s| s.parse::<usize>().ok())
                .collect();

            if coords.len() != 2 || coords[0] > 2 || coords[1] > 2 {
                println!("Invalid move! Enter row and column (0-2).");
                continue;
            }

            let index = coords[0] * 3 + coords[1];
            if !game.possible_actions().contains(&index) {
                println!("Illegal move! Try again.");
                continue;
            }
            index
        } else {
            // AI player (O)
            let index = mcts.decide(&cursor, &game, DecisionRule::Best)?;
            if !cursor.is_attached() {
                println!("(the tree has never seen this position, guessing)");
            }
            println!("AI chooses: row {}, col {}", index / 3, index % 3);
            index
        };

        mcts.advance(&mut cursor, &action);
        game.take_action(&action);
    }

    // Display final state
    println!("{}", game);

    // Report the result
    match game.winners().as_slice() {
        [winner] => println!("Player {} wins!", game.mark(*winner)),
        _ => println!("The game is a draw!"),
    }
    Ok(())
}

/// Tic-Tac-Toe game state
#[derive(Clone)]
struct TicTacToe {
    /// Board representation (None = empty, Some(player) = occupied)
    board: [Option<PlayerId>; 9],

    /// Current player's turn
    current_player: PlayerId,
}

impl TicTacToe {
    /// Creates a new empty Tic-Tac-Toe board
    fn new() -> Self {
        TicTacToe {
            board: [None; 9],
            current_player: 0,
        }
    }

    fn mark(&self, player: PlayerId) -> &'static str {
        if player == 0 {
            "X"
        } else {
            "O"
        }
    }

    /// Returns the winner of the game, if any
    fn get_winner(&self) -> Option<PlayerId> {
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

        LINES.iter().find_map(|&[a, b, c]| {
            match (self.board[a], self.board[b], self.board[c]) {
                (Some(x), Some(y), Some(z)) if x == y && y == z => Some(x),
                _ => None,
            }
        })
    }
}

impl GameState for TicTacToe {
    type Action = usize;
    type State = ([Option<PlayerId>; 9], PlayerId);

    fn render(&self) -> String {
        self.to_string()
    }

    fn state(&self) -> Self::State {
        (self.board, self.current_player)
    }

    fn number_of_players(&self) -> usize {
        2
    }

    fn current_player(&self) -> PlayerId {
        self.current_player
    }

    fn possible_actions(&self) -> Vec<usize> {
        if self.has_outcome() {
            return Vec::new();
        }
        (0..9).filter(|&i| self.board[i].is_none()).collect()
    }

    fn take_action(&mut self, action: &usize) {
        if self.board[*action].is_none() {
            self.board[*action] = Some(self.current_player);
        }
        self.current_player = 1 - self.current_player;
    }

    fn has_outcome(&self) -> bool {
        self.get_winner().is_some() || self.board.iter().all(Option::is_some)
    }

    fn winners(&self) -> Vec<PlayerId> {
        match self.get_winner() {
            Some(winner) => vec![winner],
            // Draw
            None => vec![0, 1],
        }
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  0 1 2")?;
        for row in 0..3 {
            write!(f, "{} ", row)?;
            for col in 0..3 {
                let symbol = match self.board[row * 3 + col] {
                    Some(player) => self.mark(player),
                    None => ".",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\nPlayer {}'s turn", self.mark(self.current_player))?;
        Ok(())
    }
}
