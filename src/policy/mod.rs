//! Policies for different phases of the MCTS algorithm
//!
//! - Selection: how the best child of a node is scored and chosen
//! - Backpropagation: how a finished episode credits the nodes it traversed
//! - Decision: how an action is picked once training has stopped

pub mod backpropagation;
pub mod decision;
pub mod selection;

pub use backpropagation::{backpropagate, Winners};
pub use decision::DecisionRule;
pub use selection::{Scoring, SelectionPolicy};
