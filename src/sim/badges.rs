//! Stage badges
//!
//! The badge row under the score shows the stage number in denominations of
//! 50, 30, 20, 10, 5 and 1. From StageAnnounce on, the badges are revealed one
//! at a time, each with a chime, until the row is complete.

use serde::{Deserialize, Serialize};

/// Badge denominations, largest first
pub const BADGE_VALUES: [u32; 6] = [50, 30, 20, 10, 5, 1];

/// Count of each badge denomination for one stage number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageBadges {
    pub c50: u32,
    pub c30: u32,
    pub c20: u32,
    pub c10: u32,
    pub c5: u32,
    pub c1: u32,
}

impl StageBadges {
    /// Decompose `stage_number` into badge counts
    ///
    /// Fifties first, then the tens digit of the remainder (40 is two 20s,
    /// never 30 + 10), then the units as fives and ones.
    pub fn decompose(stage_number: u32) -> Self {
        let rest = stage_number % 50;
        let (c30, c20, c10) = match rest / 10 {
            0 => (0, 0, 0),
            1 => (0, 0, 1),
            2 => (0, 1, 0),
            3 => (1, 0, 0),
            _ => (0, 2, 0),
        };
        let units = rest % 10;
        Self {
            c50: stage_number / 50,
            c30,
            c20,
            c10,
            c5: units / 5,
            c1: units % 5,
        }
    }

    /// Counts in [`BADGE_VALUES`] order
    pub fn counts(&self) -> [u32; 6] {
        [self.c50, self.c30, self.c20, self.c10, self.c5, self.c1]
    }

    /// Number of badge icons
    pub fn total(&self) -> u32 {
        self.counts().iter().sum()
    }

    /// Stage number the badges stand for
    pub fn value(&self) -> u32 {
        self.counts()
            .iter()
            .zip(BADGE_VALUES)
            .map(|(count, value)| count * value)
            .sum()
    }
}

/// One-at-a-time badge reveal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeReveal {
    pub badges: StageBadges,
    /// Icons currently visible
    pub shown: u32,
    timer_ms: u32,
}

impl BadgeReveal {
    /// Reset for a new stage; nothing shown yet
    pub fn start(&mut self, stage_number: u32) {
        self.badges = StageBadges::decompose(stage_number);
        self.shown = 0;
        self.timer_ms = 0;
    }

    pub fn total(&self) -> u32 {
        self.badges.total()
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.total()
    }

    /// Advance the reveal; true when a badge was revealed this call
    ///
    /// Reveals at most one badge per call and carries the remainder.
    pub fn advance(&mut self, dt_ms: u32, period_ms: u32) -> bool {
        if self.is_complete() {
            return false;
        }
        let period = period_ms.max(1);
        self.timer_ms = self.timer_ms.saturating_add(dt_ms);
        if self.timer_ms < period {
            return false;
        }
        self.timer_ms = (self.timer_ms - period).min(period - 1);
        self.shown += 1;
        true
    }
}
