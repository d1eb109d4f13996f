//! TETRS - falling-block gameplay engine
//!
//! The engine is a pure state machine ([`Game`]) over a sparse [`Grid`],
//! driven by player [`Action`]s and gravity ticks. [`Runtime`] schedules
//! gravity and serializes commands on a tokio task, and [`GestureTranslator`]
//! turns pointer drags into the same actions a keyboard would produce.

pub mod bag;
pub mod board;
pub mod collision;
pub mod game;
pub mod gesture;
pub mod input;
pub mod persistence;
pub mod piece;
pub mod position;
pub mod runtime;
pub mod score;
pub mod settings;
pub mod srs;
pub mod tetromino;
pub mod ui;

pub use bag::{Bag, Sequence, Sequencer};
pub use board::Grid;
pub use game::{Action, Game, GameConfig, GameEvent, GameState, Phase};
pub use gesture::{GestureConfig, GestureTranslator, Point};
pub use persistence::{FileGameStore, GameStore, MemoryGameStore, StoreError};
pub use piece::Tetromino;
pub use position::Position;
pub use runtime::{Runtime, RuntimeConfig, RuntimeEvent, RuntimeHandle};
pub use score::Score;
pub use settings::{Difficulty, Settings};
pub use tetromino::TetrominoType;
