//! Statistics collection for MCTS sessions
//!
//! This module provides structures for collecting and reporting statistics
//! about the episodes an engine has run.

use std::time::Duration;

/// Statistics collected while the engine runs episodes
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatistics {
    /// Number of `step` calls completed
    pub iterations: usize,

    /// Number of training episodes backpropagated into the tree
    pub episodes: usize,

    /// Total number of nodes in the tree
    pub tree_size: usize,

    /// Longest root-to-outcome path seen in an episode
    pub max_path_length: usize,

    /// Total time spent in `step`
    pub total_time: Duration,
}

impl SearchStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        SearchStatistics {
            iterations: 0,
            episodes: 0,
            tree_size: 1, // Start with root node
            max_path_length: 0,
            total_time: Duration::from_secs(0),
        }
    }

    /// Returns the average time per iteration in microseconds
    pub fn avg_time_per_iteration_us(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.iterations as f64
    }

    /// Returns the number of iterations per second
    pub fn iterations_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.iterations as f64 / self.total_time.as_secs_f64()
    }

    pub(crate) fn record_episode(&mut self, path_length: usize, tree_size: usize) {
        self.episodes += 1;
        self.max_path_length = self.max_path_length.max(path_length);
        self.tree_size = tree_size;
    }

    /// Returns a summary of the statistics as a string
    pub fn summary(&self) -> String {
        format!(
            "MCTS Statistics:\n\
             - Iterations: {}\n\
             - Training episodes: {}\n\
             - Total time: {:.3} seconds\n\
             - Tree size: {} nodes\n\
             - Longest path: {}\n\
             - Avg time per iteration: {:.3} µs\n\
             - Iterations per second: {:.1}",
            self.iterations,
            self.episodes,
            self.total_time.as_secs_f64(),
            self.tree_size,
            self.max_path_length,
            self.avg_time_per_iteration_us(),
            self.iterations_per_second(),
        )
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}
