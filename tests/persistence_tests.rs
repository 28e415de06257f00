mod common;

use std::fs;

use common::{tree_fingerprint, Countdown, Ending, TicTacToe};
use rollout_mcts::{GameState, LoopMode, MCTSConfig, MCTSError, Scoring, MCTS};

fn trained(config: MCTSConfig, episodes: usize) -> MCTS<TicTacToe> {
    let mut mcts = MCTS::new(TicTacToe::new(), config).unwrap();
    mcts.self_play(episodes).unwrap();
    mcts
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.json");

    let original = trained(MCTSConfig::mcts().with_seed(3), 3);
    original.save(&path).unwrap();

    let mut restored = MCTS::new(TicTacToe::new(), MCTSConfig::mcts()).unwrap();
    restored.load(&path, TicTacToe::new()).unwrap();

    assert_eq!(restored.root().visits(), 3);
    assert_eq!(restored.tree().len(), original.tree().len());
    assert_eq!(
        tree_fingerprint(restored.tree()),
        tree_fingerprint(original.tree())
    );
    assert_eq!(restored.get_statistics().iterations, 0);
    assert_eq!(restored.get_statistics().tree_size, restored.tree().len());
}

#[test]
fn test_loaded_tree_keeps_merging_transpositions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.json");

    let original = trained(MCTSConfig::mcts().with_seed(9), 200);
    original.save(&path).unwrap();

    let mut restored = MCTS::new(TicTacToe::new(), MCTSConfig::mcts()).unwrap();
    restored.load(&path, TicTacToe::new()).unwrap();

    let mut game = TicTacToe::new();
    game.take_action(&4);
    let expected = original.tree().lookup(game.current_player(), &game.state());
    assert!(expected.is_some());
    assert_eq!(
        restored.tree().lookup(game.current_player(), &game.state()),
        expected
    );

    restored.step().unwrap();
    assert_eq!(restored.root().visits(), 201);
}

#[test]
fn test_load_rejects_mismatched_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.json");

    trained(MCTSConfig::mcts().with_seed(3), 3).save(&path).unwrap();

    let mut session = MCTS::new(TicTacToe::new(), MCTSConfig::mcts()).unwrap();
    let mut advanced = TicTacToe::new();
    advanced.take_action(&0);

    let result = session.load(&path, advanced);

    assert!(matches!(result, Err(MCTSError::StateRootMismatch { .. })));
    assert_eq!(session.tree().len(), 1);
    assert_eq!(session.root().visits(), 0);
    assert_eq!(session.game().board, [0; 9]);
}

#[test]
fn test_load_replaces_tree_config_but_keeps_session_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.json");

    let saved = MCTSConfig::uct(0.9)
        .with_transpositions(false)
        .with_seed(5);
    trained(saved, 20).save(&path).unwrap();

    let live = MCTSConfig::mcts().with_training(false).with_seed(6);
    let mut session = MCTS::new(TicTacToe::new(), live).unwrap();
    session.load(&path, TicTacToe::new()).unwrap();

    let config = session.config();
    assert_eq!(config.scoring, Scoring::Ucb1);
    assert_eq!(config.exploration_constant, 0.9);
    assert!(!config.use_transpositions);
    assert!(!config.training);
    assert_eq!(config.seed, Some(6));
    assert_eq!(session.selection_policy().scoring, Scoring::Ucb1);
    assert!(!session.tree().transpositions_enabled());
}

#[test]
fn test_open_loop_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("open.json");
    let game = Countdown::new(4, 3, 2, Ending::LastMoverWins);

    let mut original = MCTS::open_loop(game.clone(), true).unwrap();
    original.self_play(50).unwrap();
    original.save(&path).unwrap();

    let mut restored = MCTS::closed_loop(game.clone(), true, true).unwrap();
    restored.load(&path, game.clone()).unwrap();

    assert_eq!(restored.tree().loop_mode(), LoopMode::OpenLoop);
    assert_eq!(
        tree_fingerprint(restored.tree()),
        tree_fingerprint(original.tree())
    );

    let mut advanced = game;
    advanced.take_action(&0);
    assert!(matches!(
        restored.load(&path, advanced),
        Err(MCTSError::StateRootMismatch { .. })
    ));
}

#[test]
fn test_seeded_saves_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    trained(MCTSConfig::uct(1.0).with_seed(42), 100)
        .save(&first)
        .unwrap();
    trained(MCTSConfig::uct(1.0).with_seed(42), 100)
        .save(&second)
        .unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_reroot_resumes_mid_game() {
    let mut mcts = trained(MCTSConfig::mcts().with_seed(12), 500);

    let mut game = TicTacToe::new();
    game.take_action(&4);
    mcts.reroot(game.clone()).unwrap();

    assert_eq!(mcts.root().state(), Some(&game.state()));
    assert_eq!(mcts.root().mover(), 1);

    let before = mcts.root().visits();
    mcts.step().unwrap();
    assert_eq!(mcts.root().visits(), before + 1);
    assert!(mcts.best_action().is_some());
}

#[test]
fn test_reroot_without_transpositions_needs_same_position() {
    let mut mcts = trained(MCTSConfig::mcts().with_transpositions(false).with_seed(12), 50);

    let mut game = TicTacToe::new();
    game.take_action(&4);
    assert!(matches!(
        mcts.reroot(game),
        Err(MCTSError::StateRootMismatch { .. })
    ));

    mcts.reroot(TicTacToe::new()).unwrap();
    assert_eq!(mcts.root().visits(), 50);
}

#[test]
fn test_corrupt_snapshots_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "not a snapshot").unwrap();

    let mut session = MCTS::new(TicTacToe::new(), MCTSConfig::mcts()).unwrap();
    assert!(matches!(
        session.load(&garbage, TicTacToe::new()),
        Err(MCTSError::Serialization(_))
    ));

    let path = dir.path().join("tree.json");
    trained(MCTSConfig::mcts().with_seed(1), 5).save(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"format_version\":1"));
    let future = dir.path().join("future.json");
    fs::write(&future, text.replace("\"format_version\":1", "\"format_version\":99")).unwrap();

    assert!(matches!(
        session.load(&future, TicTacToe::new()),
        Err(MCTSError::CorruptSnapshot(_))
    ));
    assert_eq!(session.tree().len(), 1);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = MCTS::new(TicTacToe::new(), MCTSConfig::mcts()).unwrap();

    assert!(matches!(
        session.load(dir.path().join("missing.json"), TicTacToe::new()),
        Err(MCTSError::Io(_))
    ));
}
