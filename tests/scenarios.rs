//! End-to-end scenarios through the public API

use std::sync::Arc;
use std::time::Duration;
use tetrs::score::level_for;
use tetrs::{
    Action, FileGameStore, Game, GameConfig, GameEvent, GameState, GameStore, GestureConfig,
    GestureTranslator, Grid, MemoryGameStore, Phase, Point, Position, Runtime, RuntimeConfig,
    RuntimeEvent, Score, Sequence, Tetromino, TetrominoType,
};

fn drop_until_game_over(game: &mut Game) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..200 {
        events.extend(game.process_action(Action::HardDrop));
        if game.phase() == Phase::GameOver {
            return events;
        }
    }
    panic!("stack never reached the top");
}

#[test]
fn test_i_piece_falls_and_locks_on_floor() {
    let state = GameState {
        grid: Grid::default(),
        current: Some(Tetromino::new(TetrominoType::I)),
        position: Position::new(3, -2),
        next: Tetromino::new(TetrominoType::T),
        score: Score::new(),
        game_over: false,
        paused: false,
    };
    let mut game = Game::restore(state, Sequence::new(vec![TetrominoType::S]), false).unwrap();

    while game.state().position.y < 18 {
        assert!(game.process_action(Action::SoftDrop).is_empty());
    }
    assert_eq!(game.state().position, Position::new(3, 18));

    game.process_action(Action::SoftDrop);
    let state = game.state();
    let locked: Vec<_> = state.grid.cells().collect();
    assert_eq!(locked.len(), 4);
    assert!(locked.iter().all(|(pos, kind)| pos.y == 19 && *kind == TetrominoType::I));
    assert_eq!(state.score, Score::new());
    assert_eq!(state.current.map(|p| p.kind), Some(TetrominoType::T));
    assert_eq!(state.next.kind, TetrominoType::S);
}

#[test]
fn test_clearing_two_separate_rows() {
    let mut grid = Grid::new(10, 20);
    for x in 0..10 {
        grid.set(Position::new(x, 2), TetrominoType::I);
        grid.set(Position::new(x, 5), TetrominoType::I);
    }
    grid.set(Position::new(1, 0), TetrominoType::T);
    grid.set(Position::new(7, 3), TetrominoType::L);
    grid.set(Position::new(4, 9), TetrominoType::Z);

    let (cleared, count) = grid.clear_lines();
    assert_eq!(count, 2);
    // Above both cleared rows: down two
    assert_eq!(cleared.get(Position::new(1, 2)), Some(TetrominoType::T));
    // Between them: down one
    assert_eq!(cleared.get(Position::new(7, 4)), Some(TetrominoType::L));
    // Below both: untouched
    assert_eq!(cleared.get(Position::new(4, 9)), Some(TetrominoType::Z));
    assert_eq!(cleared.filled(), 3);
}

#[test]
fn test_level_progression() {
    assert_eq!(level_for(0), 1);
    assert_eq!(level_for(9), 1);
    assert_eq!(level_for(10), 2);
    assert_eq!(level_for(25), 3);
    assert!((0..200).all(|n| level_for(n) <= level_for(n + 1)));
}

#[test]
fn test_stacking_to_the_top_ends_the_game() {
    let mut game = Game::new(2024);
    let events = drop_until_game_over(&mut game);

    assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    assert!(game.state().current.is_none());

    let over = game.snapshot();
    for action in [
        Action::MoveLeft,
        Action::MoveRight,
        Action::SoftDrop,
        Action::Rotate,
        Action::HardDrop,
        Action::Pause,
        Action::Resume,
    ] {
        assert!(game.process_action(action).is_empty());
    }
    assert!(game.tick().is_empty());
    assert_eq!(game.snapshot(), over);

    assert_eq!(game.process_action(Action::Retry), vec![GameEvent::Reset]);
    assert_eq!(game.phase(), Phase::Active);
    assert!(game.state().grid.is_empty());
}

#[test]
fn test_score_never_decreases() {
    // Flat O pieces on a 4-wide board clear two rows per pair
    let config = GameConfig {
        width: 4,
        ..GameConfig::default()
    };
    let mut game = Game::with_sequencer(Sequence::new(vec![TetrominoType::O]), config);
    let mut last = game.state().score;
    let mut cleared = 0;
    for i in 0..20 {
        // Alternate columns 0-1 and 2-3
        let shift = if i % 2 == 0 { Action::MoveLeft } else { Action::MoveRight };
        game.process_action(shift);
        game.process_action(shift);
        for event in game.process_action(Action::HardDrop) {
            if let GameEvent::LinesCleared(n) = event {
                cleared += n;
            }
        }
        let score = game.state().score;
        assert!(score.points >= last.points);
        assert!(score.lines >= last.lines);
        last = score;
    }
    assert_eq!(game.phase(), Phase::Active);
    assert_eq!(cleared, 20);
    assert_eq!(last.lines, 20);
}

#[test]
fn test_gesture_drives_session() {
    let pieces = Sequence::new(vec![TetrominoType::T]);
    let mut game = Game::with_sequencer(pieces, GameConfig::default());
    let mut gestures = GestureTranslator::new(GestureConfig::default());
    let ms = Duration::from_millis;

    // Drag two cells right
    gestures.begin(Point::new(100.0, 100.0), ms(0));
    let mut actions = gestures.update(Point::new(140.0, 100.0), ms(60));
    actions.extend(gestures.end(Point::new(170.0, 100.0), ms(400)));
    assert_eq!(actions, vec![Action::MoveRight, Action::MoveRight]);
    for action in actions {
        game.process_action(action);
    }
    assert_eq!(game.state().position, Position::new(5, 0));

    // Tap
    gestures.begin(Point::new(50.0, 50.0), ms(1000));
    for action in gestures.end(Point::new(52.0, 50.0), ms(1080)) {
        game.process_action(action);
    }
    assert_eq!(game.state().current.map(|p| p.rotation), Some(1));

    // Flick down
    gestures.begin(Point::new(50.0, 50.0), ms(2000));
    gestures.update(Point::new(50.0, 70.0), ms(2010));
    let actions = gestures.end(Point::new(50.0, 110.0), ms(2020));
    assert_eq!(actions, vec![Action::HardDrop]);
    for action in actions {
        game.process_action(action);
    }
    assert_eq!(game.state().grid.filled(), 4);
}

#[test]
fn test_saved_game_resumes_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileGameStore::new(dir.path().join("savegame.json"));

    let mut game = Game::new(8);
    game.process_action(Action::HardDrop);
    game.process_action(Action::MoveRight);
    game.process_action(Action::Pause);
    store.save(game.state()).unwrap();

    let loaded = store.load().unwrap().unwrap();
    let mut resumed = Game::restore(loaded, Sequence::new(vec![]), false).unwrap();
    assert_eq!(resumed.snapshot(), game.snapshot());
    assert_eq!(resumed.phase(), Phase::Paused);
    assert_eq!(resumed.process_action(Action::Resume), vec![GameEvent::Resumed]);
}

#[tokio::test]
async fn test_runtime_game_over_clears_save() {
    let mut paused = Game::new(3);
    paused.process_action(Action::Pause);
    let store = Arc::new(MemoryGameStore::with_saved(paused.snapshot()));

    let config = RuntimeConfig {
        seed: Some(3),
        ..RuntimeConfig::default()
    };
    let (handle, task) = Runtime::spawn(config, Some(store.clone()));
    let mut events = handle.subscribe();

    let mut over = false;
    for _ in 0..200 {
        handle.action(Action::HardDrop).await.unwrap();
        if handle.state().await.unwrap().game_over {
            over = true;
            break;
        }
    }
    assert!(over);

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let RuntimeEvent::Game(GameEvent::GameOver { .. }) = events.recv().await.unwrap() {
                break;
            }
        }
    })
    .await
    .unwrap();

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(!store.has_saved());
}
