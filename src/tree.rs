//! Tree data structures for Monte Carlo Tree Search
//!
//! Nodes live in an arena owned by [`SearchTree`] and refer to each other
//! through [`NodeId`] handles. With the transposition index enabled a node may
//! be the child of several parents, so the structure is a DAG and nodes carry
//! no parent handle; the index is the authoritative (mover, state) lookup.

use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::LoopMode;
use crate::game_state::PlayerId;

/// Handle of a node inside a [`SearchTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node denotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKey<K, A> {
    /// Closed loop: the position reached
    State(K),
    /// Open loop: the action that produced the node (`None` for the root)
    Action(Option<A>),
}

/// One vertex of the search tree
///
/// `mover` is the player whose action leaves this node; credit stored in a
/// node belongs to the mover of the node it was reached from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCTSNode<K, A> {
    mover: PlayerId,
    key: NodeKey<K, A>,
    parent: Option<NodeId>,
    children: Vec<(A, NodeId)>,
    expanded: bool,
    terminal: bool,
    visits: u64,
    credit: f64,
}

impl<K, A> MCTSNode<K, A> {
    fn new(mover: PlayerId, key: NodeKey<K, A>, parent: Option<NodeId>) -> Self {
        MCTSNode {
            mover,
            key,
            parent,
            children: Vec::new(),
            expanded: false,
            terminal: false,
            visits: 0,
            credit: 0.0,
        }
    }

    /// Player to move at this node
    pub fn mover(&self) -> PlayerId {
        self.mover
    }

    /// Key identifying the node
    pub fn key(&self) -> &NodeKey<K, A> {
        &self.key
    }

    /// Position denoted by a closed-loop node
    pub fn state(&self) -> Option<&K> {
        match &self.key {
            NodeKey::State(state) => Some(state),
            NodeKey::Action(_) => None,
        }
    }

    /// Action that produced an open-loop node
    pub fn action(&self) -> Option<&A> {
        match &self.key {
            NodeKey::State(_) => None,
            NodeKey::Action(action) => action.as_ref(),
        }
    }

    /// Parent handle, absent for the root and for every node of a DAG
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[(A, NodeId)] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True once every legal action of the node has been enumerated
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// True once an episode has ended at this node
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Number of episodes that traversed this node
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Credit earned by the predecessor's mover across those episodes
    pub fn credit(&self) -> f64 {
        self.credit
    }

    /// Average credit of the node
    ///
    /// An unvisited node is infinitely desirable while training, so that it
    /// gets explored, and neutral (`0.0`) at decision time, so that it never
    /// wins over explored siblings.
    pub fn eval(&self, training: bool) -> f64 {
        if self.visits > 0 {
            self.credit / self.visits as f64
        } else if training {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Records one traversal and adds `credit` to the running total
    pub fn record_visit(&mut self, credit: f64) {
        self.visits += 1;
        self.credit += credit;
    }

    pub(crate) fn mark_expanded(&mut self) {
        self.expanded = true;
    }

    pub(crate) fn mark_terminal(&mut self) {
        self.terminal = true;
    }
}

impl<K, A: PartialEq> MCTSNode<K, A> {
    /// Child reached through `action`, if any
    pub fn child(&self, action: &A) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(a, _)| a == action)
            .map(|(_, id)| *id)
    }
}

/// Arena of nodes with an optional transposition index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize, A: Serialize",
    deserialize = "K: DeserializeOwned, A: DeserializeOwned"
))]
pub struct SearchTree<K, A> {
    nodes: Vec<MCTSNode<K, A>>,
    root: NodeId,
    loop_mode: LoopMode,
    transpositions_enabled: bool,
    #[serde(skip)]
    index: HashMap<(PlayerId, K), NodeId>,
}

impl<K, A> SearchTree<K, A>
where
    K: Clone + Eq + std::hash::Hash,
    A: Clone + PartialEq,
{
    /// Creates a closed-loop tree rooted at `(mover, state)`
    pub fn closed_loop(mover: PlayerId, state: K, transpositions: bool) -> Self {
        let mut tree = SearchTree {
            nodes: Vec::new(),
            root: NodeId(0),
            loop_mode: LoopMode::ClosedLoop,
            transpositions_enabled: transpositions,
            index: HashMap::new(),
        };
        let root = tree.allocate(MCTSNode::new(mover, NodeKey::State(state.clone()), None));
        if transpositions {
            tree.index.insert((mover, state), root);
        }
        tree.root = root;
        tree
    }

    /// Creates an open-loop tree whose root has `mover` to play
    pub fn open_loop(mover: PlayerId) -> Self {
        SearchTree {
            nodes: vec![MCTSNode::new(mover, NodeKey::Action(None), None)],
            root: NodeId(0),
            loop_mode: LoopMode::OpenLoop,
            transpositions_enabled: false,
            index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn transpositions_enabled(&self) -> bool {
        self.transpositions_enabled
    }

    /// Number of distinct nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &MCTSNode<K, A> {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode<K, A> {
        &mut self.nodes[id.0]
    }

    /// Iterates over all nodes with their handles
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode<K, A>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Looks up the node registered for `(mover, state)`
    pub fn lookup(&self, mover: PlayerId, state: &K) -> Option<NodeId> {
        if self.transpositions_enabled {
            self.index.get(&(mover, state.clone())).copied()
        } else {
            self.iter()
                .find(|(_, n)| n.mover == mover && n.state() == Some(state))
                .map(|(id, _)| id)
        }
    }

    /// Registers the child of `parent` reached through `action`
    ///
    /// With transpositions the child is the shared node for `(mover, state)`,
    /// otherwise a fresh node parented to `parent`. Calling it again with an
    /// action the parent already knows returns the existing child.
    pub fn add_state_child(&mut self, parent: NodeId, mover: PlayerId, state: K, action: A) -> NodeId {
        if let Some(existing) = self.get(parent).child(&action) {
            return existing;
        }

        let child = if self.transpositions_enabled {
            let key = (mover, state);
            let shared = self.index.get(&key).copied();
            match shared {
                Some(shared) => shared,
                None => {
                    let id = self.allocate(MCTSNode::new(mover, NodeKey::State(key.1.clone()), None));
                    self.index.insert(key, id);
                    id
                }
            }
        } else {
            self.allocate(MCTSNode::new(mover, NodeKey::State(state), Some(parent)))
        };

        self.get_mut(parent).children.push((action, child));
        child
    }

    /// Registers the open-loop child of `parent` for `action`
    pub fn add_action_child(&mut self, parent: NodeId, mover: PlayerId, action: A) -> NodeId {
        if let Some(existing) = self.get(parent).child(&action) {
            return existing;
        }

        let child = self.allocate(MCTSNode::new(
            mover,
            NodeKey::Action(Some(action.clone())),
            Some(parent),
        ));
        self.get_mut(parent).children.push((action, child));
        child
    }

    /// Samples one of the node's actions uniformly
    pub fn choose_random_action<R: Rng + ?Sized>(&self, id: NodeId, rng: &mut R) -> Option<A> {
        self.get(id)
            .children
            .choose(rng)
            .map(|(action, _)| action.clone())
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Rebuilds the transposition index from the arena.
    pub(crate) fn rebuild_index(&mut self) {
        self.index.clear();
        if !self.transpositions_enabled {
            return;
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let NodeKey::State(state) = &node.key {
                self.index.insert((node.mover, state.clone()), NodeId(i));
            }
        }
    }

    /// Checks that every handle points inside the arena.
    pub(crate) fn handles_in_bounds(&self) -> bool {
        let len = self.nodes.len();
        self.root.0 < len
            && self.nodes.iter().all(|n| {
                n.parent.map_or(true, |p| p.0 < len) && n.children.iter().all(|(_, c)| c.0 < len)
            })
    }

    fn allocate(&mut self, node: MCTSNode<K, A>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}
