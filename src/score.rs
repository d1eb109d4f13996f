//! Scoring and level progression
//!
//! Classic guideline table: 100 / 300 / 500 / 800 points for 1-4 lines,
//! multiplied by the level the clear happened on. Levels advance every 10
//! lines and are always derived from the line total.

use serde::{Deserialize, Serialize};

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Base points for clearing 1-4 lines at once
const LINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];

/// Level for a line total: floor(lines / 10) + 1
pub fn level_for(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Points for clearing `lines` rows at once on `level`
pub fn score_for(lines: u32, level: u32) -> u64 {
    let base = LINE_SCORES[(lines as usize).min(LINE_SCORES.len() - 1)];
    base * level as u64
}

/// Result of recording a line clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Points awarded for this clear
    pub points: u64,
    /// New level if this clear crossed a level boundary
    pub level_up: Option<u32>,
}

/// Score tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Total lines cleared
    pub lines: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> u32 {
        level_for(self.lines)
    }

    /// Record a clear of `cleared` rows in one lock
    pub fn add_clear(&mut self, cleared: u32) -> ClearOutcome {
        if cleared == 0 {
            return ClearOutcome {
                points: 0,
                level_up: None,
            };
        }

        // Scored on the level the clear happened on
        let before = self.level();
        let points = score_for(cleared, before);
        // Counters stop at their maximum instead of wrapping
        self.points = self.points.saturating_add(points);
        self.lines = self.lines.saturating_add(cleared);

        let after = self.level();
        ClearOutcome {
            points,
            level_up: (after > before).then_some(after),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(9), 1);
        assert_eq!(level_for(10), 2);
        assert_eq!(level_for(25), 3);
    }

    #[test]
    fn test_level_monotonic() {
        let mut prev = level_for(0);
        for lines in 1..500 {
            let level = level_for(lines);
            assert!(level >= prev);
            prev = level;
        }
    }

    #[test]
    fn test_reward_monotonic_in_lines() {
        for level in 1..20 {
            for lines in 1..4 {
                assert!(score_for(lines + 1, level) > score_for(lines, level));
            }
        }
    }

    #[test]
    fn test_single_clear() {
        let mut score = Score::new();
        let outcome = score.add_clear(1);
        assert_eq!(outcome.points, 100);
        assert_eq!(score.points, 100);
        assert_eq!(score.lines, 1);
        assert_eq!(outcome.level_up, None);
    }

    #[test]
    fn test_tetris() {
        let mut score = Score::new();
        score.add_clear(4);
        assert_eq!(score.points, 800);
        assert_eq!(score.lines, 4);
    }

    #[test]
    fn test_level_up() {
        let mut score = Score::new();
        for _ in 0..9 {
            assert_eq!(score.add_clear(1).level_up, None);
        }
        assert_eq!(score.add_clear(1).level_up, Some(2));
        assert_eq!(score.level(), 2);
        // Next clear scores at level 2
        assert_eq!(score.add_clear(1).points, 200);
    }

    #[test]
    fn test_counters_saturate() {
        let mut score = Score {
            points: u64::MAX - 50,
            lines: u32::MAX - 1,
        };
        let outcome = score.add_clear(4);
        assert!(outcome.points > 50);
        assert_eq!(score.points, u64::MAX);
        assert_eq!(score.lines, u32::MAX);
        assert_eq!(outcome.level_up, None);
    }

    #[test]
    fn test_zero_lines_is_noop() {
        let mut score = Score::new();
        score.add_clear(0);
        assert_eq!(score, Score::new());
    }
}
