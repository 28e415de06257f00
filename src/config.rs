//! Configuration options for the MCTS engine
//!
//! This module defines the parameters that shape the search tree and the
//! engine session. The tree-shaping choices are made once at construction:
//! how children are keyed ([`LoopMode`]) and how they are scored ([`Scoring`]).

use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use crate::policy::decision::DecisionRule;
pub use crate::policy::selection::Scoring;

/// How the children of a node are identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Children denote the position reached after an action.
    ///
    /// Combined with transpositions, positions reached through different
    /// action orders share one node.
    ClosedLoop,

    /// Children denote the action taken; positions are never inspected.
    ///
    /// Suited to processes whose state is non-deterministic or has no usable
    /// key. The search can only be driven from the original root.
    OpenLoop,
}

/// Configuration for the MCTS engine
///
/// Use the builder methods or one of the presets to create a configuration.
///
/// # Example
///
/// ```
/// use rollout_mcts::{MCTSConfig, config::Scoring};
///
/// let config = MCTSConfig::default()
///     .with_scoring(Scoring::Ucb1)
///     .with_exploration_constant(1.5)
///     .with_transpositions(false)
///     .with_seed(7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCTSConfig {
    /// Scoring rule applied by `choose_best_action`
    pub scoring: Scoring,

    /// Exploration constant `c` of UCB1, ignored by [`Scoring::Average`]
    pub exploration_constant: f64,

    /// Whether children are keyed by position or by action
    pub loop_mode: LoopMode,

    /// Whether identical (mover, state) pairs share one node
    ///
    /// Only meaningful in [`LoopMode::ClosedLoop`].
    pub use_transpositions: bool,

    /// Training grows the tree; evaluation only plays through it
    pub training: bool,

    /// Seed of the engine's random source, `None` for an entropy seed
    pub seed: Option<u64>,

    /// Rule used to pick actions during evaluation playthroughs
    pub decision_rule: DecisionRule,

    /// Log progress every this many iterations of `self_play`
    pub log_interval: Option<usize>,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        MCTSConfig {
            scoring: Scoring::Average,
            exploration_constant: SQRT_2,
            loop_mode: LoopMode::ClosedLoop,
            use_transpositions: true,
            training: true,
            seed: None,
            decision_rule: DecisionRule::Best,
            log_interval: None,
        }
    }
}

impl MCTSConfig {
    /// Closed-loop search scored by plain averages
    pub fn mcts() -> Self {
        Self::default()
    }

    /// Closed-loop search scored by UCB1
    pub fn uct(exploration_constant: f64) -> Self {
        Self::default()
            .with_scoring(Scoring::Ucb1)
            .with_exploration_constant(exploration_constant)
    }

    /// Open-loop search scored by plain averages
    pub fn open_loop() -> Self {
        Self::default()
            .with_loop_mode(LoopMode::OpenLoop)
            .with_transpositions(false)
    }

    /// Open-loop search scored by UCB1
    pub fn open_loop_uct(exploration_constant: f64) -> Self {
        Self::open_loop()
            .with_scoring(Scoring::Ucb1)
            .with_exploration_constant(exploration_constant)
    }

    /// Sets the scoring rule
    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets how children are keyed
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Sets whether to use the transposition index
    pub fn with_transpositions(mut self, use_transpositions: bool) -> Self {
        self.use_transpositions = use_transpositions;
        self
    }

    /// Sets training or evaluation mode
    pub fn with_training(mut self, training: bool) -> Self {
        self.training = training;
        self
    }

    /// Seeds the engine's random source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the rule used by evaluation playthroughs
    pub fn with_decision_rule(mut self, rule: DecisionRule) -> Self {
        self.decision_rule = rule;
        self
    }

    /// Enables progress logging every `interval` iterations
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = Some(interval);
        self
    }

    /// Returns true when the transposition index is active
    pub fn transpositions_active(&self) -> bool {
        self.use_transpositions && self.loop_mode == LoopMode::ClosedLoop
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(crate::MCTSError::InvalidConfiguration(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if self.loop_mode == LoopMode::OpenLoop && self.use_transpositions {
            return Err(crate::MCTSError::InvalidConfiguration(
                "open-loop search cannot use transpositions".to_string(),
            ));
        }
        if self.log_interval == Some(0) {
            return Err(crate::MCTSError::InvalidConfiguration(
                "log interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
