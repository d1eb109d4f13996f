//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled, then dealt out before reshuffling. This bounds
//! droughts: no type is ever more than 12 pieces away.

use crate::tetromino::TetrominoType;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of upcoming piece types
pub trait Sequencer: Send {
    fn next_piece(&mut self) -> TetrominoType;
}

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    /// Preview queue for upcoming pieces
    queue: VecDeque<TetrominoType>,
    rng: ChaCha8Rng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a bag with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a bag whose sequence is fixed by `seed`
    pub fn with_seed(seed: u64) -> Self {
        let mut bag = Self {
            queue: VecDeque::with_capacity(14),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        // Fill the queue with at least 2 full bags
        bag.refill();
        bag.refill();
        bag
    }

    /// Get the next piece from the queue
    pub fn next(&mut self) -> TetrominoType {
        // Ensure we always have pieces in the queue
        if self.queue.len() <= 7 {
            self.refill();
        }
        self.queue.pop_front().unwrap_or(TetrominoType::T)
    }

    /// Refill the queue with a new shuffled bag
    fn refill(&mut self) {
        let mut new_bag = TetrominoType::all();
        new_bag.shuffle(&mut self.rng);
        self.queue.extend(new_bag);
    }
}

impl Sequencer for Bag {
    fn next_piece(&mut self) -> TetrominoType {
        self.next()
    }
}

/// Deals a fixed list of types in a loop
#[derive(Debug, Clone)]
pub struct Sequence {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl Sequence {
    /// Falls back to the full type list when `pieces` is empty
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        let pieces = if pieces.is_empty() {
            TetrominoType::all().to_vec()
        } else {
            pieces
        };
        Self { pieces, index: 0 }
    }
}

impl Sequencer for Sequence {
    fn next_piece(&mut self) -> TetrominoType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
