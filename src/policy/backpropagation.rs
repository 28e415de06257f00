//! Backpropagation for the MCTS algorithm
//!
//! Credit earned on an edge belongs to the player who moved along it, i.e.
//! the mover of the edge's source node. A win shared by `k` players is worth
//! `1 / k` to each of them.

use crate::game_state::PlayerId;
use crate::tree::{NodeId, SearchTree};

/// Sorted, duplicate-free list of winners of an episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winners(Vec<PlayerId>);

impl Winners {
    pub fn new(mut players: Vec<PlayerId>) -> Self {
        players.sort_unstable();
        players.dedup();
        Winners(players)
    }

    pub fn as_slice(&self) -> &[PlayerId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Credit due to `mover` for this outcome
    pub fn credit_share(&self, mover: PlayerId) -> f64 {
        if self.0.binary_search(&mover).is_ok() {
            1.0 / self.0.len() as f64
        } else {
            0.0
        }
    }
}

/// Applies one finished episode to every node on `path`
///
/// The root gains a visit but no credit; every later node gains a visit and
/// the share due to the mover of the node before it. The last node is marked
/// terminal.
pub fn backpropagate<K, A>(tree: &mut SearchTree<K, A>, path: &[NodeId], winners: &Winners)
where
    K: Clone + Eq + std::hash::Hash,
    A: Clone + PartialEq,
{
    let Some((&first, _)) = path.split_first() else {
        return;
    };

    tree.get_mut(first).record_visit(0.0);

    for pair in path.windows(2) {
        let credit = winners.credit_share(tree.get(pair[0]).mover());
        tree.get_mut(pair[1]).record_visit(credit);
    }

    if let Some(&last) = path.last() {
        tree.get_mut(last).mark_terminal();
    }
}
