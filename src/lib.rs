//! # rollout-mcts
//!
//! A Monte Carlo Tree Search (MCTS) engine for turn-based, possibly
//! multi-player decision processes. The engine needs no model of the process
//! beyond the ability to copy it and play it forward.
//!
//! ## Features
//!
//! - Generic over any process implementing [`GameState`]
//! - Transposition index merging positions reached through different move orders
//! - Plain-average and UCB1 (UCT) scoring
//! - Open-loop trees for processes without a usable state key
//! - Seedable, reproducible episodes
//! - JSON snapshots of the tree that can be reloaded against a live process
//!
//! ## Basic Usage
//!
//! ```
//! use rollout_mcts::{GameState, MCTSConfig, MCTS};
//!
//! // Players alternately take one to three stones; whoever takes the last wins.
//! #[derive(Clone)]
//! struct Nim {
//!     stones: u8,
//!     player: usize,
//! }
//!
//! impl GameState for Nim {
//!     type Action = u8;
//!     type State = (u8, usize);
//!
//!     fn render(&self) -> String {
//!         format!("{} stones, player {} to move", self.stones, self.player)
//!     }
//!     fn state(&self) -> (u8, usize) {
//!         (self.stones, self.player)
//!     }
//!     fn number_of_players(&self) -> usize {
//!         2
//!     }
//!     fn current_player(&self) -> usize {
//!         self.player
//!     }
//!     fn possible_actions(&self) -> Vec<u8> {
//!         (1..=self.stones.min(3)).collect()
//!     }
//!     fn take_action(&mut self, take: &u8) {
//!         self.stones = self.stones.saturating_sub(*take);
//!         self.player = 1 - self.player;
//!     }
//!     fn has_outcome(&self) -> bool {
//!         self.stones == 0
//!     }
//!     fn winners(&self) -> Vec<usize> {
//!         // The player who just moved took the last stone.
//!         vec![1 - self.player]
//!     }
//! }
//!
//! fn main() -> Result<(), rollout_mcts::MCTSError> {
//!     let game = Nim { stones: 5, player: 0 };
//!     let config = MCTSConfig::uct(std::f64::consts::SQRT_2).with_seed(42);
//!
//!     let mut mcts = MCTS::new(game, config)?;
//!     mcts.self_play(2_000)?;
//!
//!     // Taking one stone leaves a multiple of four.
//!     assert_eq!(mcts.best_action(), Some(1));
//!     println!("{}", mcts.get_statistics().summary());
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Every [`MCTS::step`] runs one episode on a scratch copy of the process:
//!
//! 1. **Selection**: from the root, follow the best-scoring child while the
//!    current node is expanded and not terminal.
//! 2. **Expansion**: enumerate every legal action of the frontier node, then
//!    descend to one of the new children at random.
//! 3. **Simulation**: play random actions until the process reports an
//!    outcome, recording each position as a node.
//! 4. **Backpropagation**: add a visit to every node on the path and credit
//!    each edge to its mover if that mover is among the winners.

pub mod config;
pub mod game_state;
pub mod mcts;
pub mod persistence;
pub mod policy;
pub mod stats;
pub mod tree;

pub use config::{LoopMode, MCTSConfig, Scoring};
pub use game_state::{Action, GameState, PlayerId, StateKey};
pub use mcts::{Playthrough, TreeCursor, MCTS};
pub use policy::{DecisionRule, SelectionPolicy};
pub use stats::SearchStatistics;
pub use tree::{MCTSNode, NodeId, NodeKey, SearchTree};

/// Error types for the MCTS engine
#[derive(thiserror::Error, Debug)]
pub enum MCTSError {
    /// The decision process breaks its contract
    #[error("Decision process contract violated: {0}")]
    ContractViolation(String),

    /// A position without an outcome offered no legal action
    #[error("Non-terminal position has no legal actions")]
    EmptyActionSpace,

    /// The restored root does not denote the canonical process's position
    #[error("Root mismatch: tree root is {expected}, canonical process is {found}")]
    StateRootMismatch { expected: String, found: String },

    /// A decision was requested for a finished episode
    #[error("No legal actions available from current state")]
    NoLegalActions,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A snapshot could be parsed but not used
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result type for MCTS operations
pub type Result<T> = std::result::Result<T, MCTSError>;
