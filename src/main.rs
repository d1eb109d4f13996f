//! TETRS - terminal driver
//!
//! Keys and mouse drags become actions for the game loop; snapshots from the
//! loop are drawn every frame.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tetrs::game::{Action, GameEvent, GameState};
use tetrs::gesture::{GestureTranslator, Point};
use tetrs::input::KeyMap;
use tetrs::persistence::{FileGameStore, GameStore};
use tetrs::runtime::{Runtime, RuntimeConfig, RuntimeEvent, RuntimeHandle};
use tetrs::settings::Settings;
use tetrs::ui::{self, View};
use tokio::sync::broadcast::error::TryRecvError;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the tetrs temp directory, creating it if needed
fn tetrs_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("tetrs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to log file
    let tetrs_dir = tetrs_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&tetrs_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        "tetrs=debug"
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::DEBUG.into()),
    );
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "TETRS starting up, session={:08x}, log={}",
        session_id,
        tetrs_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    // First run: write the defaults out so there is a file to edit
    if Settings::settings_path().is_some_and(|path| !path.exists()) {
        if let Err(e) = settings.save() {
            tracing::warn!("Could not write default settings: {}", e);
        }
    }

    let store: Option<Arc<dyn GameStore>> = match FileGameStore::default_location() {
        Ok(store) => {
            tracing::info!("Saves at {}", store.path().display());
            Some(Arc::new(store))
        }
        Err(e) => {
            tracing::warn!("Saving disabled: {}", e);
            None
        }
    };
    let has_saved = store.as_ref().is_some_and(|s| s.has_saved());

    let runtime = tokio::runtime::Runtime::new()?;
    let (handle, task) = runtime.block_on(async {
        Runtime::spawn(RuntimeConfig::from_settings(&settings), store)
    });
    if has_saved {
        runtime
            .block_on(handle.resume_saved())
            .map_err(io::Error::other)?;
    }

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &settings, &handle, &runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    // Stop the loop and let pending saves land
    runtime.block_on(async {
        if handle.shutdown().await.is_ok() {
            if let Err(e) = task.await {
                tracing::error!("Game loop panicked: {}", e);
            }
        }
    });

    if let Ok(state) = &result {
        println!("\nThanks for playing TETRS!");
        println!("Final Score: {}", state.score.points);
        println!("Level: {} | Lines: {}", state.level(), state.score.lines);
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
    handle: &RuntimeHandle,
    rt: &tokio::runtime::Runtime,
) -> io::Result<GameState> {
    let keys = KeyMap::from_settings(settings);
    let mut gestures = GestureTranslator::new(settings.gesture);
    let mut events = handle.subscribe();
    let snapshots = handle.snapshots();
    let started = Instant::now();
    let mut view = View {
        difficulty: settings.gameplay.difficulty.name(),
        notice: None,
    };

    loop {
        let state = snapshots.borrow().clone();

        // Drain runtime events
        loop {
            match events.try_recv() {
                Ok(RuntimeEvent::Game(GameEvent::Quit)) => return Ok(state),
                Ok(RuntimeEvent::Game(GameEvent::Reset)) => view.notice = None,
                Ok(RuntimeEvent::Game(GameEvent::LevelUp(level))) => {
                    view.notice = Some(format!("Level {}!", level));
                }
                Ok(RuntimeEvent::Notice(message)) => view.notice = Some(message),
                Ok(RuntimeEvent::Restored) => view.notice = Some("Game restored".to_string()),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} runtime events", skipped);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => return Ok(state),
            }
        }

        terminal.draw(|frame| ui::render_game(frame, &state, &view))?;

        if !event::poll(FRAME_DURATION)? {
            continue;
        }

        let actions = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                keys.action_for(key, state.phase()).into_iter().collect()
            }
            Event::Mouse(mouse) => {
                mouse_actions(&mut gestures, mouse, started.elapsed(), settings.gesture.cell_size)
            }
            _ => Vec::new(),
        };

        for action in actions {
            if rt.block_on(handle.action(action)).is_err() {
                tracing::warn!("Game loop stopped, exiting");
                return Ok(state);
            }
        }
    }
}

/// Feed a mouse event to the gesture translator
///
/// A board cell is two terminal columns wide and one row tall, so both are
/// scaled to `cell_size` pixels.
fn mouse_actions(
    gestures: &mut GestureTranslator,
    mouse: MouseEvent,
    at: Duration,
    cell_size: f32,
) -> Vec<Action> {
    let point = Point::new(
        mouse.column as f32 * cell_size / 2.0,
        mouse.row as f32 * cell_size,
    );
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            gestures.begin(point, at);
            Vec::new()
        }
        MouseEventKind::Drag(MouseButton::Left) => gestures.update(point, at),
        MouseEventKind::Up(MouseButton::Left) => gestures.end(point, at),
        MouseEventKind::Down(_) => {
            gestures.cancel();
            Vec::new()
        }
        _ => Vec::new(),
    }
}
