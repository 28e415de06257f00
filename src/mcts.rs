//! Main implementation of the Monte Carlo Tree Search engine
//!
//! This module contains the engine session, orchestrating the four phases of
//! selection, expansion, simulation and backpropagation on a scratch copy of
//! the canonical decision process, plus the decision-time helpers used once
//! training has stopped.

use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::{
    config::{LoopMode, MCTSConfig},
    game_state::{validate_contract, GameState, PlayerId},
    policy::{
        backpropagation::{backpropagate, Winners},
        decision::DecisionRule,
        selection::SelectionPolicy,
    },
    stats::SearchStatistics,
    tree::{MCTSNode, NodeId, SearchTree},
    MCTSError, Result,
};

/// Tree over the keys and actions of `G`
pub type GameTree<G> = SearchTree<<G as GameState>::State, <G as GameState>::Action>;

/// Node over the keys and actions of `G`
pub type GameNode<G> = MCTSNode<<G as GameState>::State, <G as GameState>::Action>;

/// Record of one evaluation playthrough
#[derive(Debug, Clone, PartialEq)]
pub struct Playthrough<A> {
    /// Actions taken, in order
    pub actions: Vec<A>,
    /// Rendering of every position, the final one included
    pub frames: Vec<String>,
    /// Winners reported at the end
    pub winners: Vec<PlayerId>,
    /// Number of actions picked at random because the tree had no advice
    pub random_actions: usize,
}

/// Position of an external play loop inside the tree
///
/// A detached cursor (one that followed an action the tree never saw) gives
/// no more advice; decisions made from it are uniformly random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeCursor {
    node: Option<NodeId>,
}

impl TreeCursor {
    /// Node the cursor points at
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_attached(&self) -> bool {
        self.node.is_some()
    }
}

/// The Monte Carlo Tree Search engine
///
/// The engine owns the canonical decision process, a scratch copy that is
/// driven through each episode and then discarded, and the search tree.
pub struct MCTS<G: GameState> {
    pub(crate) game: G,
    pub(crate) scratch: G,
    pub(crate) tree: GameTree<G>,
    pub(crate) config: MCTSConfig,
    pub(crate) policy: SelectionPolicy,
    rng: StdRng,
    pub(crate) statistics: SearchStatistics,
}

impl<G: GameState> MCTS<G> {
    /// Creates an engine for `game` with the given configuration
    pub fn new(game: G, config: MCTSConfig) -> Result<Self> {
        config.validate()?;
        validate_contract(&game)?;

        let tree = fresh_tree(&game, &config);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let policy = SelectionPolicy::new(config.scoring, config.exploration_constant);

        Ok(MCTS {
            scratch: game.clone(),
            game,
            tree,
            config,
            policy,
            rng,
            statistics: SearchStatistics::new(),
        })
    }

    /// Closed-loop search scored by plain averages
    pub fn closed_loop(game: G, allow_transpositions: bool, training: bool) -> Result<Self> {
        let config = MCTSConfig::mcts()
            .with_transpositions(allow_transpositions)
            .with_training(training);
        Self::new(game, config)
    }

    /// Closed-loop search scored by UCB1
    pub fn uct(game: G, allow_transpositions: bool, training: bool, c: f64) -> Result<Self> {
        let config = MCTSConfig::uct(c)
            .with_transpositions(allow_transpositions)
            .with_training(training);
        Self::new(game, config)
    }

    /// Open-loop search scored by plain averages
    pub fn open_loop(game: G, training: bool) -> Result<Self> {
        Self::new(game, MCTSConfig::open_loop().with_training(training))
    }

    /// Open-loop search scored by UCB1
    pub fn open_loop_uct(game: G, training: bool, c: f64) -> Result<Self> {
        Self::new(game, MCTSConfig::open_loop_uct(c).with_training(training))
    }

    /// The canonical decision process
    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn tree(&self) -> &GameTree<G> {
        &self.tree
    }

    pub fn root(&self) -> &GameNode<G> {
        self.tree.get(self.tree.root())
    }

    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    pub fn selection_policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn is_training(&self) -> bool {
        self.config.training
    }

    /// Switches between training and evaluation
    pub fn set_training(&mut self, training: bool) {
        self.config.training = training;
    }

    /// Returns the session statistics
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Runs exactly one episode
    ///
    /// In training mode the episode grows the tree; in evaluation mode it is
    /// a playthrough that only reads the tree and logs every rendered frame.
    /// Either way the scratch copy is reset afterwards. An error aborts the
    /// episode before any statistic is touched.
    pub fn step(&mut self) -> Result<()> {
        let start = Instant::now();

        let result = if self.config.training {
            self.run_episode()
        } else {
            self.play_scratch(self.config.decision_rule).map(|playthrough| {
                for frame in &playthrough.frames {
                    info!("\n{}", frame);
                }
                info!("Winners: {:?}", playthrough.winners);
            })
        };

        self.scratch = self.game.clone();
        result?;

        self.statistics.iterations += 1;
        self.statistics.total_time += start.elapsed();
        Ok(())
    }

    /// Runs `iterations` episodes
    pub fn self_play(&mut self, iterations: usize) -> Result<()> {
        let mode = if self.config.training {
            "Training"
        } else {
            "Evaluating"
        };
        info!("{} for {} iterations", mode, iterations);
        let start = Instant::now();

        for i in 0..iterations {
            self.step()?;

            if let Some(interval) = self.config.log_interval {
                if (i + 1) % interval == 0 {
                    info!(
                        "{}: {}/{} iterations, {} nodes",
                        mode,
                        i + 1,
                        iterations,
                        self.tree.len()
                    );
                }
            }
        }

        info!(
            "{} finished: {} iterations in {:.3}s, tree has {} nodes",
            mode,
            iterations,
            start.elapsed().as_secs_f64(),
            self.tree.len()
        );
        Ok(())
    }

    /// Plays one game from the canonical position without touching the tree
    pub fn playthrough(&mut self, rule: DecisionRule) -> Result<Playthrough<G::Action>> {
        self.scratch = self.game.clone();
        let result = self.play_scratch(rule);
        self.scratch = self.game.clone();
        result
    }

    /// Best action at the root by plain average, `None` before any expansion
    pub fn best_action(&self) -> Option<G::Action> {
        self.policy
            .choose_best_action(&self.tree, self.tree.root(), false)
    }

    /// Cursor at the root of the tree
    pub fn cursor(&self) -> TreeCursor {
        TreeCursor {
            node: Some(self.tree.root()),
        }
    }

    /// Moves `cursor` along `action`, detaching it if the tree has no such child
    pub fn advance(&self, cursor: &mut TreeCursor, action: &G::Action) {
        if let Some(node) = cursor.node {
            cursor.node = self.tree.get(node).child(action);
            if cursor.node.is_none() {
                debug!(
                    "No child for action {:?} at node {}; later decisions are random",
                    action, node
                );
            }
        }
    }

    /// Picks an action for `game` at `cursor`
    ///
    /// Uses `rule` on the cursor's children when the cursor is attached and
    /// the advised action is legal, a uniformly random legal action otherwise.
    pub fn decide(
        &mut self,
        cursor: &TreeCursor,
        game: &G,
        rule: DecisionRule,
    ) -> Result<G::Action> {
        if game.has_outcome() {
            return Err(MCTSError::NoLegalActions);
        }
        let legal = game.possible_actions();

        if let Some(node) = cursor.node {
            if let Some(action) = rule.choose(&self.tree, node, &self.policy, &mut self.rng) {
                if legal.contains(&action) {
                    return Ok(action);
                }
                debug!("Advised action {:?} is not legal; choosing at random", action);
            }
        }

        legal
            .choose(&mut self.rng)
            .cloned()
            .ok_or(MCTSError::EmptyActionSpace)
    }

    /// Returns a visualization of the tree down to `max_depth`
    pub fn visualize_tree(&self, max_depth: usize) -> String {
        let mut result = String::new();
        self.visualize_node(self.tree.root(), "Root", 0, max_depth, &mut result);
        result
    }

    fn visualize_node(
        &self,
        id: NodeId,
        label: &str,
        depth: usize,
        max_depth: usize,
        output: &mut String,
    ) {
        let node = self.tree.get(id);
        output.push_str(&format!(
            "{}{} (mover: {}, visits: {}, value: {:.3})\n",
            "  ".repeat(depth),
            label,
            node.mover(),
            node.visits(),
            node.eval(false)
        ));

        if depth >= max_depth {
            return;
        }
        for (action, child) in node.children() {
            self.visualize_node(*child, &format!("{:?}", action), depth + 1, max_depth, output);
        }
    }

    fn run_episode(&mut self) -> Result<()> {
        let path = self.selection();
        let path = self.expansion(path)?;
        let path = self.simulation(path)?;
        self.backpropagation(&path);
        Ok(())
    }

    /// Selection phase: descend while the tail is expanded and not terminal
    fn selection(&mut self) -> Vec<NodeId> {
        let mut path = vec![self.tree.root()];

        loop {
            let tail = path[path.len() - 1];
            let node = self.tree.get(tail);
            if !node.is_expanded() || node.is_terminal() {
                break;
            }

            let Some(action) = self
                .policy
                .choose_best_action(&self.tree, tail, self.config.training)
            else {
                break;
            };
            let Some(child) = node.child(&action) else {
                break;
            };

            self.scratch.take_action(&action);
            path.push(child);
        }

        path
    }

    /// Expansion phase: enumerate every legal action at the frontier, then
    /// descend one level at random
    fn expansion(&mut self, mut path: Vec<NodeId>) -> Result<Vec<NodeId>> {
        let frontier = path[path.len() - 1];

        if self.scratch.has_outcome() {
            self.tree.get_mut(frontier).mark_terminal();
            return Ok(path);
        }
        if self.tree.get(frontier).is_expanded() {
            return Ok(path);
        }

        let actions = self.scratch.possible_actions();
        if actions.is_empty() {
            return Err(MCTSError::EmptyActionSpace);
        }

        for action in actions {
            let mut trial = self.scratch.clone();
            trial.take_action(&action);
            attach_child(&mut self.tree, frontier, action, &trial);
        }
        self.tree.get_mut(frontier).mark_expanded();

        let action = self
            .tree
            .choose_random_action(frontier, &mut self.rng)
            .ok_or(MCTSError::EmptyActionSpace)?;
        let child = self
            .tree
            .get(frontier)
            .child(&action)
            .ok_or(MCTSError::EmptyActionSpace)?;

        self.scratch.take_action(&action);
        path.push(child);
        Ok(path)
    }

    /// Simulation phase: random actions until an outcome, recording each
    /// position reached as a node
    fn simulation(&mut self, mut path: Vec<NodeId>) -> Result<Vec<NodeId>> {
        while !self.scratch.has_outcome() {
            let action = self
                .scratch
                .possible_actions()
                .choose(&mut self.rng)
                .cloned()
                .ok_or(MCTSError::EmptyActionSpace)?;

            self.scratch.take_action(&action);
            let tail = path[path.len() - 1];
            let child = attach_child(&mut self.tree, tail, action, &self.scratch);
            path.push(child);
        }

        Ok(path)
    }

    /// Backpropagation phase: credit the path with the scratch copy's outcome
    fn backpropagation(&mut self, path: &[NodeId]) {
        let winners = Winners::new(self.scratch.winners());
        backpropagate(&mut self.tree, path, &winners);

        self.statistics.record_episode(path.len(), self.tree.len());
        debug!(
            "Episode finished: path length {}, winners {:?}, {} nodes",
            path.len(),
            winners.as_slice(),
            self.tree.len()
        );
    }

    /// Greedy (or rule-driven) playthrough of the scratch copy
    fn play_scratch(&mut self, rule: DecisionRule) -> Result<Playthrough<G::Action>> {
        let mut cursor = self.cursor();
        let mut playthrough = Playthrough {
            actions: Vec::new(),
            frames: Vec::new(),
            winners: Vec::new(),
            random_actions: 0,
        };

        while !self.scratch.has_outcome() {
            playthrough.frames.push(self.scratch.render());

            let legal = self.scratch.possible_actions();
            let advised = cursor
                .node
                .filter(|&node| self.tree.get(node).has_children())
                .and_then(|node| rule.choose(&self.tree, node, &self.policy, &mut self.rng))
                .filter(|action| legal.contains(action));

            let action = match advised {
                Some(action) => {
                    self.advance(&mut cursor, &action);
                    action
                }
                None => {
                    cursor.node = None;
                    playthrough.random_actions += 1;
                    legal
                        .choose(&mut self.rng)
                        .cloned()
                        .ok_or(MCTSError::EmptyActionSpace)?
                }
            };

            self.scratch.take_action(&action);
            playthrough.actions.push(action);
        }

        playthrough.frames.push(self.scratch.render());
        playthrough.winners = Winners::new(self.scratch.winners()).as_slice().to_vec();
        Ok(playthrough)
    }
}

/// Builds the single-node tree for `game` under `config`.
pub(crate) fn fresh_tree<G: GameState>(game: &G, config: &MCTSConfig) -> GameTree<G> {
    match config.loop_mode {
        LoopMode::ClosedLoop => SearchTree::closed_loop(
            game.current_player(),
            game.state(),
            config.use_transpositions,
        ),
        LoopMode::OpenLoop => SearchTree::open_loop(game.current_player()),
    }
}

/// Registers the child of `parent` for `action`, given the process after it.
fn attach_child<G: GameState>(
    tree: &mut GameTree<G>,
    parent: NodeId,
    action: G::Action,
    after: &G,
) -> NodeId {
    match tree.loop_mode() {
        LoopMode::ClosedLoop => {
            tree.add_state_child(parent, after.current_player(), after.state(), action)
        }
        LoopMode::OpenLoop => tree.add_action_child(parent, after.current_player(), action),
    }
}
