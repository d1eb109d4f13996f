//! Tetromino definitions and shapes
//!
//! All 7 standard tetrominoes with their 4 orientations, tabulated inside the
//! guideline bounding box (4x4 for I and O, 3x3 for the rest). Offsets are
//! (x, y) with y increasing downward.

use crate::position::Position;
use serde::{Deserialize, Serialize};

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T,
    S,
    Z,
    J,
    L,
}

/// Number of tabulated orientations per type
pub const ROTATIONS: u8 = 4;

/// One orientation: 4 block offsets from the piece anchor
pub type Shape = [Position; 4];

const fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

// Orientation 0 is the spawn state, each following entry is a clockwise turn.
const I_SHAPES: [Shape; 4] = [
    [p(0, 1), p(1, 1), p(2, 1), p(3, 1)],
    [p(2, 0), p(2, 1), p(2, 2), p(2, 3)],
    [p(0, 2), p(1, 2), p(2, 2), p(3, 2)],
    [p(1, 0), p(1, 1), p(1, 2), p(1, 3)],
];

// O piece doesn't rotate
const O_SHAPE: Shape = [p(1, 0), p(2, 0), p(1, 1), p(2, 1)];
const O_SHAPES: [Shape; 4] = [O_SHAPE; 4];

// .T.    .T.    ...    .T.
// TTT    .TT    TTT    TT.
// ...    .T.    .T.    .T.
const T_SHAPES: [Shape; 4] = [
    [p(1, 0), p(0, 1), p(1, 1), p(2, 1)],
    [p(1, 0), p(1, 1), p(2, 1), p(1, 2)],
    [p(0, 1), p(1, 1), p(2, 1), p(1, 2)],
    [p(1, 0), p(0, 1), p(1, 1), p(1, 2)],
];

// .SS    .S.    ...    S..
// SS.    .SS    .SS    SS.
// ...    ..S    SS.    .S.
const S_SHAPES: [Shape; 4] = [
    [p(1, 0), p(2, 0), p(0, 1), p(1, 1)],
    [p(1, 0), p(1, 1), p(2, 1), p(2, 2)],
    [p(1, 1), p(2, 1), p(0, 2), p(1, 2)],
    [p(0, 0), p(0, 1), p(1, 1), p(1, 2)],
];

// ZZ.    ..Z    ...    .Z.
// .ZZ    .ZZ    ZZ.    ZZ.
// ...    .Z.    .ZZ    Z..
const Z_SHAPES: [Shape; 4] = [
    [p(0, 0), p(1, 0), p(1, 1), p(2, 1)],
    [p(2, 0), p(1, 1), p(2, 1), p(1, 2)],
    [p(0, 1), p(1, 1), p(1, 2), p(2, 2)],
    [p(1, 0), p(0, 1), p(1, 1), p(0, 2)],
];

const J_SHAPES: [Shape; 4] = [
    [p(0, 0), p(0, 1), p(1, 1), p(2, 1)],
    [p(1, 0), p(2, 0), p(1, 1), p(1, 2)],
    [p(0, 1), p(1, 1), p(2, 1), p(2, 2)],
    [p(1, 0), p(1, 1), p(0, 2), p(1, 2)],
];

const L_SHAPES: [Shape; 4] = [
    [p(2, 0), p(0, 1), p(1, 1), p(2, 1)],
    [p(1, 0), p(1, 1), p(1, 2), p(2, 2)],
    [p(0, 1), p(1, 1), p(2, 1), p(0, 2)],
    [p(0, 0), p(1, 0), p(1, 1), p(1, 2)],
];

impl TetrominoType {
    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// All 4 orientations of this type
    pub fn shapes(&self) -> &'static [Shape; 4] {
        match self {
            TetrominoType::I => &I_SHAPES,
            TetrominoType::O => &O_SHAPES,
            TetrominoType::T => &T_SHAPES,
            TetrominoType::S => &S_SHAPES,
            TetrominoType::Z => &Z_SHAPES,
            TetrominoType::J => &J_SHAPES,
            TetrominoType::L => &L_SHAPES,
        }
    }

    /// Block offsets for a rotation index, taken mod 4
    pub fn shape(&self, rotation: u8) -> Shape {
        self.shapes()[(rotation % ROTATIONS) as usize]
    }
}
