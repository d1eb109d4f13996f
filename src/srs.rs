//! Super Rotation System (SRS) wall kick data
//!
//! Optional: with kicks disabled a blocked rotation is simply refused. When
//! enabled, these offsets are tried in order for a clockwise turn and the
//! first placeable one wins.

use crate::position::Position;
use crate::tetromino::TetrominoType;

const fn k(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

// Offsets are (x, y) with y down, i.e. the guideline table with y negated.
// Indexed by the rotation being left: 0->1, 1->2, 2->3, 3->0.
const JLSTZ_KICKS: [[Position; 5]; 4] = [
    [k(0, 0), k(-1, 0), k(-1, -1), k(0, 2), k(-1, 2)],
    [k(0, 0), k(1, 0), k(1, 1), k(0, -2), k(1, -2)],
    [k(0, 0), k(1, 0), k(1, -1), k(0, 2), k(1, 2)],
    [k(0, 0), k(-1, 0), k(-1, 1), k(0, -2), k(-1, -2)],
];

const I_KICKS: [[Position; 5]; 4] = [
    [k(0, 0), k(-2, 0), k(1, 0), k(-2, 1), k(1, -2)],
    [k(0, 0), k(-1, 0), k(2, 0), k(-1, -2), k(2, 1)],
    [k(0, 0), k(2, 0), k(-1, 0), k(2, -1), k(-1, 2)],
    [k(0, 0), k(1, 0), k(-2, 0), k(1, 2), k(-2, -1)],
];

const NO_KICKS: [Position; 5] = [k(0, 0); 5];

/// Kick offsets for a clockwise turn out of rotation `from`
pub fn get_wall_kicks(kind: TetrominoType, from: u8) -> &'static [Position; 5] {
    let from = (from % 4) as usize;
    match kind {
        TetrominoType::O => &NO_KICKS,
        TetrominoType::I => &I_KICKS[from],
        _ => &JLSTZ_KICKS[from],
    }
}
