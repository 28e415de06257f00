//! Saving and restoring search trees
//!
//! A snapshot is a JSON document holding the arena, the root handle and the
//! tree-shaping configuration. Live decision-process objects and the random
//! source are never written; the caller supplies the canonical process again
//! at load time and the tree is re-attached to it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::MCTSConfig,
    game_state::{validate_contract, GameState},
    mcts::{GameTree, MCTS},
    policy::selection::SelectionPolicy,
    stats::SearchStatistics,
    tree::{NodeId, SearchTree},
    MCTSError, Result,
};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(bound(serialize = "K: Serialize, A: Serialize"))]
struct SnapshotRef<'a, K, A> {
    format_version: u32,
    training: bool,
    config: &'a MCTSConfig,
    tree: &'a SearchTree<K, A>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "K: DeserializeOwned, A: DeserializeOwned"))]
struct Snapshot<K, A> {
    format_version: u32,
    training: bool,
    config: MCTSConfig,
    tree: SearchTree<K, A>,
}

impl<G: GameState> MCTS<G> {
    /// Writes the tree and its configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let snapshot = SnapshotRef {
            format_version: FORMAT_VERSION,
            training: self.config.training,
            config: &self.config,
            tree: &self.tree,
        };

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;

        info!("Saved {} nodes to {}", self.tree.len(), path.display());
        Ok(())
    }

    /// Replaces the session's tree with the snapshot at `path`
    ///
    /// `game` becomes the canonical process. Its (mover, state) must resolve
    /// to the snapshot's root, otherwise [`MCTSError::StateRootMismatch`] is
    /// returned and the session is left untouched. The live training flag,
    /// seed and decision rule are kept.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, game: G) -> Result<()> {
        let path = path.as_ref();
        validate_contract(&game)?;

        let reader = BufReader::new(File::open(path)?);
        let snapshot: Snapshot<G::State, G::Action> = serde_json::from_reader(reader)?;

        if snapshot.format_version != FORMAT_VERSION {
            return Err(MCTSError::CorruptSnapshot(format!(
                "unsupported format version {}",
                snapshot.format_version
            )));
        }
        snapshot.config.validate()?;

        let mut tree = snapshot.tree;
        if !tree.handles_in_bounds() {
            return Err(MCTSError::CorruptSnapshot(
                "node handle outside the arena".to_string(),
            ));
        }
        tree.rebuild_index();

        let saved_root = tree.root();
        let resolved = resolve_root(&tree, &game);
        if resolved != Some(saved_root) {
            return Err(root_mismatch(&tree, saved_root, &game));
        }

        let mut config = self.config.clone();
        if (config.scoring, config.loop_mode, config.use_transpositions)
            != (
                snapshot.config.scoring,
                snapshot.config.loop_mode,
                snapshot.config.use_transpositions,
            )
            || config.exploration_constant != snapshot.config.exploration_constant
        {
            warn!(
                "Snapshot {} replaces the session configuration: {:?}/{:?}, transpositions {}, c = {}",
                path.display(),
                snapshot.config.scoring,
                snapshot.config.loop_mode,
                snapshot.config.use_transpositions,
                snapshot.config.exploration_constant
            );
        }
        config.scoring = snapshot.config.scoring;
        config.exploration_constant = snapshot.config.exploration_constant;
        config.loop_mode = snapshot.config.loop_mode;
        config.use_transpositions = snapshot.config.use_transpositions;
        if snapshot.training != config.training {
            debug!(
                "Snapshot was saved with training = {}; keeping training = {}",
                snapshot.training, config.training
            );
        }

        self.policy = SelectionPolicy::new(config.scoring, config.exploration_constant);
        self.config = config;
        self.tree = tree;
        self.scratch = game.clone();
        self.game = game;
        self.statistics = SearchStatistics::new();
        self.statistics.tree_size = self.tree.len();

        info!("Loaded {} nodes from {}", self.tree.len(), path.display());
        Ok(())
    }

    /// Moves the root to the node denoting `game`'s current position
    ///
    /// With transpositions any (mover, state) pair the search has visited
    /// can become the new root, which lets a session resume mid-game. Other
    /// trees carry no usable state identity, so only the current root's own
    /// position is accepted.
    pub fn reroot(&mut self, game: G) -> Result<()> {
        validate_contract(&game)?;

        let root = self.tree.root();
        let target = resolve_root(&self.tree, &game)
            .ok_or_else(|| root_mismatch(&self.tree, root, &game))?;

        self.tree.set_root(target);
        self.scratch = game.clone();
        self.game = game;

        info!(
            "Rerooted at node {} ({} visits)",
            target,
            self.tree.get(target).visits()
        );
        Ok(())
    }
}

/// Node that `game`'s (mover, state) denotes in `tree`.
fn resolve_root<G: GameState>(tree: &GameTree<G>, game: &G) -> Option<NodeId> {
    let mover = game.current_player();
    if tree.transpositions_enabled() {
        return tree.lookup(mover, &game.state());
    }

    let root = tree.root();
    let node = tree.get(root);
    let state_matches = match node.state() {
        Some(state) => *state == game.state(),
        None => true,
    };
    (node.mover() == mover && state_matches).then_some(root)
}

fn root_mismatch<G: GameState>(tree: &GameTree<G>, root: NodeId, game: &G) -> MCTSError {
    let node = tree.get(root);
    MCTSError::StateRootMismatch {
        expected: format!("mover {} at {:?}", node.mover(), node.key()),
        found: format!("mover {} at {:?}", game.current_player(), game.state()),
    }
}
