//! Saved-game storage
//!
//! Stores are synchronous and fallible. The runtime calls them off the game
//! loop and feeds the outcome back into it, so a slow or failing disk
//! never stalls or corrupts the live session.

use crate::game::GameState;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Errors surfaced by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("save store lock was poisoned")]
    LockPoisoned,

    #[error("could not determine data directory")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted save: {0}")]
    CorruptedData(String),

    #[error("store task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Where a paused or quit session is kept between runs
pub trait GameStore: Send + Sync {
    /// Save a game state, replacing any previous one
    fn save(&self, state: &GameState) -> Result<()>;

    /// Load the saved state, if there is one
    fn load(&self) -> Result<Option<GameState>>;

    /// Delete the saved state
    fn clear(&self) -> Result<()>;

    /// Check if a state exists
    fn has_saved(&self) -> bool;
}

/// JSON file store
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write leaves the previous save intact.
pub struct FileGameStore {
    path: PathBuf,
}

impl FileGameStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `savegame.json` in the platform data directory
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "tetrs", "tetrs").ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir().join("savegame.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameStore for FileGameStore {
    fn save(&self, state: &GameState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(state)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved game to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<GameState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path)?;
        let state: GameState = serde_json::from_slice(&bytes)?;
        state
            .validate()
            .map_err(|e| StoreError::CorruptedData(e.to_string()))?;

        tracing::debug!("Loaded game from {}", self.path.display());
        Ok(Some(state))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn has_saved(&self) -> bool {
        self.path.exists()
    }
}

/// In-memory store for tests and local runs
#[derive(Default)]
pub struct MemoryGameStore {
    saved: RwLock<Option<GameState>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a state already saved
    pub fn with_saved(state: GameState) -> Self {
        Self {
            saved: RwLock::new(Some(state)),
        }
    }
}

impl GameStore for MemoryGameStore {
    fn save(&self, state: &GameState) -> Result<()> {
        let mut saved = self.saved.write().map_err(|_| StoreError::LockPoisoned)?;
        *saved = Some(state.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<GameState>> {
        let saved = self.saved.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(saved.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut saved = self.saved.write().map_err(|_| StoreError::LockPoisoned)?;
        *saved = None;
        Ok(())
    }

    fn has_saved(&self) -> bool {
        self.saved
            .read()
            .map(|saved| saved.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Action, Game};

    fn played_state() -> GameState {
        let mut game = Game::new(11);
        game.process_action(Action::HardDrop);
        game.process_action(Action::MoveLeft);
        game.snapshot()
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGameStore::new(dir.path().join("saves").join("game.json"));
        assert!(!store.has_saved());
        assert!(store.load().unwrap().is_none());

        let state = played_state();
        store.save(&state).unwrap();
        assert!(store.has_saved());
        assert_eq!(store.load().unwrap(), Some(state));

        store.clear().unwrap();
        assert!(!store.has_saved());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        fs::write(&path, b"{not json").unwrap();
        let store = FileGameStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_file_store_rejects_overlapping_piece() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGameStore::new(dir.path().join("game.json"));
        let mut state = played_state();
        let cells = state.current_cells().unwrap();
        for cell in cells {
            state.grid.set(cell, crate::tetromino::TetrominoType::Z);
        }
        store.save(&state).unwrap();
        assert!(matches!(store.load(), Err(StoreError::CorruptedData(_))));
    }

    #[test]
    fn test_file_store_rejects_far_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        let store = FileGameStore::new(&path);
        assert_eq!(store.path(), path.as_path());

        let mut state = played_state();
        state.position.x = i32::MAX;
        store.save(&state).unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::CorruptedData(msg) if msg.contains("far outside")));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryGameStore::new();
        assert!(!store.has_saved());
        let state = played_state();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
