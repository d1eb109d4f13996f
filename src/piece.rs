//! Falling piece value type

use crate::position::Position;
use crate::tetromino::{ROTATIONS, Shape, TetrominoType};
use serde::{Deserialize, Serialize};

/// A tetromino in one orientation
///
/// Fully described by its type and rotation index: the blocks always equal
/// the catalog entry for that pair, which deserialization re-derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PieceRepr", into = "PieceRepr")]
pub struct Tetromino {
    pub kind: TetrominoType,
    pub blocks: Shape,
    /// Rotation index, 0..=3
    pub rotation: u8,
}

#[derive(Serialize, Deserialize)]
struct PieceRepr {
    kind: TetrominoType,
    rotation: u8,
}

impl TryFrom<PieceRepr> for Tetromino {
    type Error = String;

    fn try_from(repr: PieceRepr) -> Result<Self, Self::Error> {
        if repr.rotation >= ROTATIONS {
            return Err(format!(
                "rotation {} out of range for {:?}",
                repr.rotation, repr.kind
            ));
        }
        Ok(Tetromino::create(repr.kind, repr.rotation))
    }
}

impl From<Tetromino> for PieceRepr {
    fn from(piece: Tetromino) -> Self {
        PieceRepr {
            kind: piece.kind,
            rotation: piece.rotation,
        }
    }
}

impl Tetromino {
    /// Build a piece from the catalog, `rotation` taken mod 4
    pub fn create(kind: TetrominoType, rotation: u8) -> Self {
        let rotation = rotation % ROTATIONS;
        Self {
            kind,
            blocks: kind.shape(rotation),
            rotation,
        }
    }

    /// Spawn orientation
    pub fn new(kind: TetrominoType) -> Self {
        Self::create(kind, 0)
    }

    /// Next orientation in the clockwise 4-cycle
    pub fn rotate(&self) -> Self {
        Self::create(self.kind, self.rotation + 1)
    }

    /// Absolute block positions with the anchor at `offset`
    pub fn cells_at(&self, offset: Position) -> [Position; 4] {
        self.blocks.map(|b| b + offset)
    }
}
