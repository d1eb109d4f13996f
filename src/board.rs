//! Game board representation
//!
//! Sparse occupancy: only filled cells are stored. All stored keys are inside
//! the board; rows above the top (y < 0) are never persisted.

use crate::piece::Tetromino;
use crate::position::Position;
use crate::tetromino::TetrominoType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard board dimensions
pub const BOARD_WIDTH: i32 = 10;
pub const BOARD_HEIGHT: i32 = 20;

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "GridRepr")]
pub struct Grid {
    width: i32,
    height: i32,
    cells: HashMap<Position, TetrominoType>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Grid {
    /// Create a new empty board
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bounds check only, does not consult occupancy
    pub fn is_position_valid(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    pub fn is_position_occupied(&self, pos: Position) -> bool {
        self.cells.contains_key(&pos)
    }

    /// The type that filled a cell, if any
    pub fn get(&self, pos: Position) -> Option<TetrominoType> {
        self.cells.get(&pos).copied()
    }

    /// Fill one cell, returns false if out of bounds
    pub fn set(&mut self, pos: Position, kind: TetrominoType) -> bool {
        if !self.is_position_valid(pos) {
            return false;
        }
        self.cells.insert(pos, kind);
        true
    }

    /// Write the piece's 4 cells anchored at `offset`
    ///
    /// The caller has validated the cells are empty and in bounds. Anything
    /// outside the board is dropped rather than stored.
    pub fn lock_piece(&self, piece: &Tetromino, offset: Position) -> Grid {
        let mut next = self.clone();
        for cell in piece.cells_at(offset) {
            next.set(cell, piece.kind);
        }
        next
    }

    /// Remove complete rows and compact the survivors downward
    ///
    /// Returns the new board and the number of rows removed.
    pub fn clear_lines(&self) -> (Grid, u32) {
        let complete: Vec<bool> = (0..self.height).map(|y| self.is_line_full(y)).collect();
        let cleared = complete.iter().filter(|&&full| full).count() as u32;
        if cleared == 0 {
            return (self.clone(), 0);
        }

        let mut next = Grid::new(self.width, self.height);
        let mut write_row = self.height - 1;
        for read_row in (0..self.height).rev() {
            if complete[read_row as usize] {
                continue;
            }
            for x in 0..self.width {
                if let Some(kind) = self.get(Position::new(x, read_row)) {
                    next.cells.insert(Position::new(x, write_row), kind);
                }
            }
            write_row -= 1;
        }

        (next, cleared)
    }

    /// Check if a row is completely filled
    pub fn is_line_full(&self, y: i32) -> bool {
        (0..self.width).all(|x| self.is_position_occupied(Position::new(x, y)))
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of filled cells
    pub fn filled(&self) -> usize {
        self.cells.len()
    }

    /// Filled cells in no particular order
    pub fn cells(&self) -> impl Iterator<Item = (Position, TetrominoType)> + '_ {
        self.cells.iter().map(|(&pos, &kind)| (pos, kind))
    }

    /// Dense top-to-bottom view for renderers
    pub fn rows(&self) -> Vec<Vec<Option<TetrominoType>>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.get(Position::new(x, y)))
                    .collect()
            })
            .collect()
    }
}

/// Serialized form: dimensions plus a flat cell list
///
/// JSON maps need string keys, and the list lets loading reject cells that
/// break the bounds invariant.
#[derive(Serialize, Deserialize)]
struct GridRepr {
    width: i32,
    height: i32,
    cells: Vec<(Position, TetrominoType)>,
}

impl From<Grid> for GridRepr {
    fn from(grid: Grid) -> Self {
        let mut cells: Vec<_> = grid.cells.into_iter().collect();
        cells.sort_by_key(|(pos, _)| (pos.y, pos.x));
        Self {
            width: grid.width,
            height: grid.height,
            cells,
        }
    }
}

impl TryFrom<GridRepr> for Grid {
    type Error = String;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        if repr.width <= 0 || repr.height <= 0 {
            return Err(format!("invalid board size {}x{}", repr.width, repr.height));
        }
        let mut grid = Grid::new(repr.width, repr.height);
        for (pos, kind) in repr.cells {
            if !grid.is_position_valid(pos) {
                return Err(format!("cell ({}, {}) outside the board", pos.x, pos.y));
            }
            if grid.cells.insert(pos, kind).is_some() {
                return Err(format!("cell ({}, {}) listed twice", pos.x, pos.y));
            }
        }
        Ok(grid)
    }
}
