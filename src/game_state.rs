//! Traits defining the decision-process contract consumed by the engine.
//!
//! The [`GameState`] trait is the only interface the search engine needs: it
//! never inspects the rules of a game, it only renders, keys, enumerates and
//! advances positions, and reads the final list of winners.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};

use crate::{MCTSError, Result};

/// Index of a player, in `[0, number_of_players)`.
pub type PlayerId = usize;

/// Trait for actions that can be taken in a decision process
///
/// Actions label the edges of the search tree, so they must be comparable and
/// serialisable. Any type meeting the bounds implements this trait.
pub trait Action: Clone + Debug + PartialEq + Serialize + DeserializeOwned {}

impl<T> Action for T where T: Clone + Debug + PartialEq + Serialize + DeserializeOwned {}

/// Trait for state keys identifying a position
///
/// Two positions must produce equal keys iff they are semantically identical.
/// A key handed out during play must never equal a key that is only used as
/// an initialisation sentinel.
pub trait StateKey: Clone + Debug + Eq + Hash + Serialize + DeserializeOwned {}

impl<T> StateKey for T where T: Clone + Debug + Eq + Hash + Serialize + DeserializeOwned {}

/// Trait defining the decision-process interface required for MCTS
///
/// The engine keeps one canonical instance and works on clones of it, so
/// `Clone` must produce an independent copy of the whole process.
pub trait GameState: Clone {
    /// The type of actions that can be taken
    type Action: Action;

    /// The hashable key of a position
    type State: StateKey;

    /// Returns a textual rendering of the current position
    fn render(&self) -> String;

    /// Returns the key of the current position
    ///
    /// Including the player to move in the key is recommended: the engine
    /// pairs the key with [`current_player`](GameState::current_player) anyway,
    /// but a key that already separates movers is easier to reason about.
    fn state(&self) -> Self::State;

    /// Returns the number of players
    fn number_of_players(&self) -> usize;

    /// Returns the player taking an action this turn
    fn current_player(&self) -> PlayerId;

    /// Returns the legal actions for the current player
    ///
    /// Must be non-empty whenever [`has_outcome`](GameState::has_outcome) is false.
    ///
    /// # Example
    ///
    /// ```
    /// # use rollout_mcts::GameState;
    /// # #[derive(Clone)]
    /// # struct Nim { stones: u8, player: usize }
    /// # impl GameState for Nim {
    /// # type Action = u8;
    /// # type State = (u8, usize);
    /// # fn render(&self) -> String { format!("{} stones", self.stones) }
    /// # fn state(&self) -> (u8, usize) { (self.stones, self.player) }
    /// # fn number_of_players(&self) -> usize { 2 }
    /// # fn current_player(&self) -> usize { self.player }
    /// fn possible_actions(&self) -> Vec<u8> {
    ///     (1..=self.stones.min(3)).collect()
    /// }
    /// # fn take_action(&mut self, n: &u8) { self.stones -= n; self.player = 1 - self.player; }
    /// # fn has_outcome(&self) -> bool { self.stones == 0 }
    /// # fn winners(&self) -> Vec<usize> { vec![1 - self.player] }
    /// # }
    /// ```
    fn possible_actions(&self) -> Vec<Self::Action>;

    /// Advances the process by one action
    ///
    /// Turn bookkeeping must advance even when called past an outcome.
    fn take_action(&mut self, action: &Self::Action);

    /// Returns true once the episode has ended
    fn has_outcome(&self) -> bool;

    /// Returns the winning players
    ///
    /// - empty: every player lost
    /// - several players: a draw or shared win between the listed players
    /// - one player: a single winner
    fn winners(&self) -> Vec<PlayerId>;
}

/// Checks the parts of the contract that can be observed on a single position.
pub(crate) fn validate_contract<G: GameState>(game: &G) -> Result<()> {
    let players = game.number_of_players();
    if players == 0 {
        return Err(MCTSError::ContractViolation(
            "number_of_players() returned 0".to_string(),
        ));
    }

    let current = game.current_player();
    if current >= players {
        return Err(MCTSError::ContractViolation(format!(
            "current_player() returned {} but there are only {} players",
            current, players
        )));
    }

    if !game.has_outcome() && game.possible_actions().is_empty() {
        return Err(MCTSError::ContractViolation(
            "possible_actions() is empty although the game has no outcome".to_string(),
        ));
    }

    Ok(())
}
