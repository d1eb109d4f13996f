//! Core game state and logic
//!
//! [`Game`] is the only thing that mutates a [`GameState`]. Each call to
//! [`Game::process_action`] or [`Game::tick`] is one complete transition:
//! validate, move, lock and clear if the piece landed, check for game over,
//! and report what happened as [`GameEvent`]s.

use crate::bag::{Bag, Sequencer};
use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Grid};
use crate::collision::{can_place, drop_position, is_above_board};
use crate::piece::Tetromino;
use crate::position::Position;
use crate::score::Score;
use crate::srs::get_wall_kicks;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    Pause,
    Resume,
    Quit,
    Retry,
}

/// Discrete notifications produced by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Rows removed by one lock
    LinesCleared(u32),
    LevelUp(u32),
    GameOver { score: u64, lines: u32 },
    Paused,
    Resumed,
    /// The player left the session
    Quit,
    /// Board and counters were reset by a retry
    Reset,
}

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Paused,
    GameOver,
}

/// Everything needed to render or resume a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub grid: Grid,
    /// Falling piece; `None` once the game is over
    pub current: Option<Tetromino>,
    /// Anchor of the current piece's blocks
    pub position: Position,
    pub next: Tetromino,
    pub score: Score,
    pub game_over: bool,
    pub paused: bool,
}

impl GameState {
    pub fn level(&self) -> u32 {
        self.score.level()
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else if self.paused {
            Phase::Paused
        } else {
            Phase::Active
        }
    }

    /// Absolute cells of the falling piece
    pub fn current_cells(&self) -> Option<[Position; 4]> {
        self.current.map(|piece| piece.cells_at(self.position))
    }

    /// Check the invariants a restored state must satisfy
    pub fn validate(&self) -> Result<(), StateError> {
        // Every block offset lies in 0..4, so cells stay addressable
        let (x, y) = (self.position.x, self.position.y);
        if !(-4..=self.grid.width()).contains(&x) || !(-4..self.grid.height()).contains(&y) {
            return Err(StateError::AnchorOutOfRange { x, y });
        }

        match (self.game_over, self.current) {
            (false, None) => Err(StateError::MissingPiece),
            (false, Some(piece)) if !can_place(&self.grid, &piece, self.position) => {
                Err(StateError::PieceOverlap {
                    x: self.position.x,
                    y: self.position.y,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Reasons a saved state cannot be resumed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("active game has no falling piece")]
    MissingPiece,

    #[error("falling piece at ({x}, {y}) overlaps the board")]
    PieceOverlap { x: i32, y: i32 },

    #[error("piece anchor ({x}, {y}) is far outside the board")]
    AnchorOutOfRange { x: i32, y: i32 },
}

/// Board size and rule toggles for a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Try SRS kick offsets when a rotation is blocked
    pub wall_kicks: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            wall_kicks: false,
        }
    }
}

const NO_KICK: [Position; 1] = [Position::new(0, 0)];

/// Anchor new pieces spawn at, centering a 4-wide box
pub fn spawn_position(width: i32) -> Position {
    Position::new((width - 4).max(0) / 2, 0)
}

/// The session controller
pub struct Game<S: Sequencer = Bag> {
    state: GameState,
    sequencer: S,
    wall_kicks: bool,
    quit: bool,
}

impl Game<Bag> {
    /// Standard board with a 7-bag seeded by `seed`
    pub fn new(seed: u64) -> Self {
        Self::with_sequencer(Bag::with_seed(seed), GameConfig::default())
    }
}

impl<S: Sequencer> Game<S> {
    /// Start a session, drawing the first current/next pair
    pub fn with_sequencer(mut sequencer: S, config: GameConfig) -> Self {
        let state = fresh_state(&mut sequencer, config.width, config.height);
        if state.game_over {
            info!("Initial spawn blocked, session starts in game over");
        }
        Self {
            state,
            sequencer,
            wall_kicks: config.wall_kicks,
            quit: false,
        }
    }

    /// Resume a previously saved state
    pub fn restore(state: GameState, sequencer: S, wall_kicks: bool) -> Result<Self, StateError> {
        state.validate()?;
        info!(
            "Restored session: score={} lines={} game_over={}",
            state.score.points, state.score.lines, state.game_over
        );
        Ok(Self {
            state,
            sequencer,
            wall_kicks,
            quit: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy for observers
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Whether the player quit
    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// Process an action
    pub fn process_action(&mut self, action: Action) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.quit {
            if action == Action::Retry {
                self.reset(&mut events);
            }
            return events;
        }

        match (self.phase(), action) {
            (_, Action::Quit) => {
                self.quit = true;
                info!("Player quit with score {}", self.state.score.points);
                events.push(GameEvent::Quit);
            }
            (_, Action::Retry) => self.reset(&mut events),
            (Phase::GameOver, _) => {}
            (Phase::Paused, Action::Resume) => {
                self.state.paused = false;
                debug!("Resumed");
                events.push(GameEvent::Resumed);
            }
            (Phase::Paused, _) => {}
            (Phase::Active, Action::Pause) => {
                self.state.paused = true;
                debug!("Paused");
                events.push(GameEvent::Paused);
            }
            (Phase::Active, Action::Resume) => {}
            (Phase::Active, Action::MoveLeft) => {
                self.shift(Position::new(-1, 0));
            }
            (Phase::Active, Action::MoveRight) => {
                self.shift(Position::new(1, 0));
            }
            (Phase::Active, Action::SoftDrop) => self.step_down(&mut events),
            (Phase::Active, Action::Rotate) => self.rotate(),
            (Phase::Active, Action::HardDrop) => self.hard_drop(&mut events),
        }
        events
    }

    /// Gravity: one cell down, locking if the piece has landed
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.quit && self.phase() == Phase::Active {
            self.step_down(&mut events);
        }
        events
    }

    fn shift(&mut self, delta: Position) -> bool {
        let Some(piece) = self.state.current else {
            return false;
        };
        let candidate = self.state.position + delta;
        if can_place(&self.state.grid, &piece, candidate) {
            self.state.position = candidate;
            true
        } else {
            false
        }
    }

    fn step_down(&mut self, events: &mut Vec<GameEvent>) {
        if !self.shift(Position::new(0, 1)) {
            self.lock_current(events);
        }
    }

    fn rotate(&mut self) {
        let Some(piece) = self.state.current else {
            return;
        };
        let rotated = piece.rotate();
        let kicks: &[Position] = if self.wall_kicks {
            get_wall_kicks(piece.kind, piece.rotation)
        } else {
            &NO_KICK
        };

        for &kick in kicks {
            let candidate = self.state.position + kick;
            if can_place(&self.state.grid, &rotated, candidate) {
                self.state.current = Some(rotated);
                self.state.position = candidate;
                return;
            }
        }
    }

    fn hard_drop(&mut self, events: &mut Vec<GameEvent>) {
        let Some(piece) = self.state.current else {
            return;
        };
        self.state.position = drop_position(&self.state.grid, &piece, self.state.position);
        self.lock_current(events);
    }

    /// Lock the current piece and spawn next
    fn lock_current(&mut self, events: &mut Vec<GameEvent>) {
        let Some(piece) = self.state.current else {
            return;
        };
        let position = self.state.position;

        // A piece resting partly above the board can't lock
        if is_above_board(&piece, position) {
            info!("Lock out: {:?} landed above the board", piece.kind);
            self.end_game(events);
            return;
        }

        let locked = self.state.grid.lock_piece(&piece, position);
        let (grid, cleared) = locked.clear_lines();
        self.state.grid = grid;
        debug!(
            "Locked {:?} at ({}, {}), cleared {}",
            piece.kind, position.x, position.y, cleared
        );

        if cleared > 0 {
            let outcome = self.state.score.add_clear(cleared);
            events.push(GameEvent::LinesCleared(cleared));
            if let Some(level) = outcome.level_up {
                info!("Level up: {}", level);
                events.push(GameEvent::LevelUp(level));
            }
        }

        self.spawn_next(events);
    }

    fn spawn_next(&mut self, events: &mut Vec<GameEvent>) {
        let upcoming = Tetromino::new(self.sequencer.next_piece());
        let piece = std::mem::replace(&mut self.state.next, upcoming);
        let position = spawn_position(self.state.grid.width());
        self.state.current = Some(piece);
        self.state.position = position;

        // Check for top out
        if !can_place(&self.state.grid, &piece, position) {
            self.end_game(events);
        }
    }

    fn end_game(&mut self, events: &mut Vec<GameEvent>) {
        self.state.current = None;
        self.state.game_over = true;
        self.state.paused = false;
        info!(
            "Game over: score={} lines={}",
            self.state.score.points, self.state.score.lines
        );
        events.push(GameEvent::GameOver {
            score: self.state.score.points,
            lines: self.state.score.lines,
        });
    }

    fn reset(&mut self, events: &mut Vec<GameEvent>) {
        let (width, height) = (self.state.grid.width(), self.state.grid.height());
        self.state = fresh_state(&mut self.sequencer, width, height);
        self.quit = false;
        info!("Session reset");
        events.push(GameEvent::Reset);
        if self.state.game_over {
            events.push(GameEvent::GameOver {
                score: 0,
                lines: 0,
            });
        }
    }
}

fn fresh_state<S: Sequencer>(sequencer: &mut S, width: i32, height: i32) -> GameState {
    let grid = Grid::new(width, height);
    let current = Tetromino::new(sequencer.next_piece());
    let next = Tetromino::new(sequencer.next_piece());
    let position = spawn_position(width);
    let blocked = !can_place(&grid, &current, position);

    GameState {
        grid,
        current: (!blocked).then_some(current),
        position,
        next,
        score: Score::new(),
        game_over: blocked,
        paused: false,
    }
}
