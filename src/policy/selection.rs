//! Selection policies for the MCTS algorithm
//!
//! The selection policy scores the children of a node and picks the action
//! leading to the highest score. Ties go to the child inserted first.

use std::f64;

use serde::{Deserialize, Serialize};

use crate::tree::{MCTSNode, NodeId, SearchTree};

/// Rule used to score children while choosing the best action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scoring {
    /// Plain average of the credit a child has earned
    Average,

    /// Upper Confidence Bound 1 while training, plain average otherwise
    Ucb1,
}

/// Scoring rule together with its exploration constant
///
/// Under [`Scoring::Ucb1`] a training-time score is
///
/// ```text
/// UCB1 = credit / visits + c * sqrt(ln(parent_visits) / visits)
/// ```
///
/// and an unvisited child scores `+inf`, so every child is tried once before
/// any is revisited. Exploration bonuses mean nothing once training has
/// stopped, so evaluation falls back to the plain average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    pub scoring: Scoring,
    pub exploration_constant: f64,
}

impl SelectionPolicy {
    pub fn new(scoring: Scoring, exploration_constant: f64) -> Self {
        SelectionPolicy {
            scoring,
            exploration_constant,
        }
    }

    /// Plain-average policy
    pub fn average() -> Self {
        Self::new(Scoring::Average, 0.0)
    }

    /// UCB1 policy with exploration constant `c`
    pub fn ucb1(c: f64) -> Self {
        Self::new(Scoring::Ucb1, c)
    }

    /// Calculates the UCB1 value of a child
    pub fn ucb1_value(&self, child_value: f64, child_visits: u64, parent_visits: u64) -> f64 {
        if child_visits == 0 {
            return f64::INFINITY;
        }

        // A DAG node can be visited through another parent before this one.
        let parent_visits = parent_visits.max(1) as f64;
        let exploration =
            self.exploration_constant * (parent_visits.ln() / child_visits as f64).sqrt();

        child_value + exploration
    }

    /// Score of `child` below a parent with `parent_visits` visits
    pub fn score<K, A>(&self, child: &MCTSNode<K, A>, parent_visits: u64, training: bool) -> f64 {
        match self.scoring {
            Scoring::Ucb1 if training => {
                self.ucb1_value(child.eval(training), child.visits(), parent_visits)
            }
            _ => child.eval(training),
        }
    }

    /// Returns the action whose child scores highest, `None` without children
    pub fn choose_best_action<K, A>(
        &self,
        tree: &SearchTree<K, A>,
        node: NodeId,
        training: bool,
    ) -> Option<A>
    where
        K: Clone + Eq + std::hash::Hash,
        A: Clone + PartialEq,
    {
        let parent = tree.get(node);
        let parent_visits = parent.visits();

        let mut best: Option<(&A, f64)> = None;
        for (action, child) in parent.children() {
            let score = self.score(tree.get(*child), parent_visits, training);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((action, score)),
            }
        }

        best.map(|(action, _)| action.clone())
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::average()
    }
}
