//! Millisecond flip-flop timers

use serde::{Deserialize, Serialize};

/// Boolean that toggles every `period_ms` of accumulated time
///
/// Driven by elapsed time, not frame count. Flips at most once per
/// [`advance`](FlipFlopTimer::advance) and carries the overshoot, so a long
/// tick is caught up over the following ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipFlopTimer {
    period_ms: u32,
    elapsed_ms: u32,
    state: bool,
}

impl FlipFlopTimer {
    pub fn new(period_ms: u32, initial: bool) -> Self {
        Self {
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
            state: initial,
        }
    }

    pub fn state(&self) -> bool {
        self.state
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Accumulate `dt_ms`; returns true if the state flipped
    pub fn advance(&mut self, dt_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        if self.elapsed_ms < self.period_ms {
            return false;
        }
        self.elapsed_ms = (self.elapsed_ms - self.period_ms).min(self.period_ms - 1);
        self.state = !self.state;
        true
    }

    /// Restart the period with a given state
    pub fn reset(&mut self, state: bool) {
        self.elapsed_ms = 0;
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flips_each_period() {
        let mut timer = FlipFlopTimer::new(500, false);
        assert!(!timer.advance(250));
        assert!(!timer.state());
        assert!(timer.advance(250));
        assert!(timer.state());
        assert!(!timer.advance(499));
        assert!(timer.advance(1));
        assert!(!timer.state());
    }

    #[test]
    fn test_carries_remainder() {
        let mut timer = FlipFlopTimer::new(500, true);
        assert!(timer.advance(600));
        assert!(!timer.state());
        // 100ms carried over
        assert!(timer.advance(400));
        assert!(timer.state());
    }

    #[test]
    fn test_long_tick_flips_once() {
        let mut timer = FlipFlopTimer::new(100, false);
        assert!(timer.advance(1000));
        assert!(timer.state());
        assert!(timer.advance(1));
        assert!(!timer.state());
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut timer = FlipFlopTimer::new(0, false);
        assert_eq!(timer.period_ms(), 1);
        assert!(timer.advance(1));
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut coarse = FlipFlopTimer::new(800, true);
        let mut fine = FlipFlopTimer::new(800, true);
        for _ in 0..10 {
            coarse.advance(80);
        }
        for _ in 0..50 {
            fine.advance(16);
        }
        assert_eq!(coarse.state(), fine.state());
    }
}
