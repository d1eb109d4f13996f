//! Placement validation
//!
//! Blocks above the top of the board (y < 0) count as free so pieces can
//! poke out transiently after a spawn or rotation. The side walls and the
//! floor are always solid.

use crate::board::Grid;
use crate::piece::Tetromino;
use crate::position::Position;

/// Whether `piece` fits with its anchor at `position`
pub fn can_place(grid: &Grid, piece: &Tetromino, position: Position) -> bool {
    piece
        .cells_at(position)
        .iter()
        .all(|&cell| is_cell_free(grid, cell))
}

fn is_cell_free(grid: &Grid, cell: Position) -> bool {
    if cell.x < 0 || cell.x >= grid.width() || cell.y >= grid.height() {
        return false;
    }
    if cell.y < 0 {
        return true;
    }
    !grid.is_position_occupied(cell)
}

/// Whether any block sits above the visible board
pub fn is_above_board(piece: &Tetromino, position: Position) -> bool {
    piece.cells_at(position).iter().any(|cell| cell.y < 0)
}

/// Lowest anchor the piece can fall to from `position`
///
/// `position` itself must already be placeable.
pub fn drop_position(grid: &Grid, piece: &Tetromino, position: Position) -> Position {
    let step = Position::new(0, 1);
    let mut landed = position;
    while can_place(grid, piece, landed + step) {
        landed = landed + step;
    }
    landed
}
