//! Integer board coordinates
//!
//! `x` grows rightward, `y` grows downward. Row 0 is the top visible row.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A cell coordinate, or a block offset relative to a piece anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_sub() {
        let a = Position::new(3, -2);
        let b = Position::new(1, 5);
        assert_eq!(a + b, Position::new(4, 3));
        assert_eq!(a - b, Position::new(2, -7));
        assert_eq!(a + b - b, a);
    }
}
