//! Decision-time action rules
//!
//! Once training has stopped, the tree is only advice. These rules turn the
//! children's average credit into one action.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::policy::selection::SelectionPolicy;
use crate::tree::{NodeId, SearchTree};

/// How an action is picked from a node's children at decision time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecisionRule {
    /// Highest average credit, first child on ties
    #[default]
    Best,
    /// Sample proportionally to the average credit
    Linear,
    /// Sample proportionally to `tanh` of the average credit
    Tanh,
    /// Sample proportionally to `exp` of the average credit
    Softmax,
}

impl DecisionRule {
    fn weight(self, score: f64) -> f64 {
        match self {
            DecisionRule::Best | DecisionRule::Linear => score,
            DecisionRule::Tanh => score.tanh(),
            DecisionRule::Softmax => score.exp(),
        }
    }

    /// Picks an action among the children of `node`, `None` without children
    pub fn choose<K, A, R>(
        self,
        tree: &SearchTree<K, A>,
        node: NodeId,
        policy: &SelectionPolicy,
        rng: &mut R,
    ) -> Option<A>
    where
        K: Clone + Eq + std::hash::Hash,
        A: Clone + PartialEq,
        R: Rng + ?Sized,
    {
        if self == DecisionRule::Best {
            return policy.choose_best_action(tree, node, false);
        }

        let children = tree.get(node).children();
        let weights: Vec<f64> = children
            .iter()
            .map(|(_, child)| self.weight(tree.get(*child).eval(false)))
            .collect();

        // All-zero weights, e.g. a node whose children never earned credit.
        match WeightedIndex::new(&weights) {
            Ok(dist) => Some(children[dist.sample(rng)].0.clone()),
            Err(_) => policy.choose_best_action(tree, node, false),
        }
    }
}
