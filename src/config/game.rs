/// Round configuration constants.
///
/// This module defines the timing of a round: the countdown shown before the
/// red phase and the bounds of the randomized red-to-green delay.
use std::time::Duration;

use rand::Rng;

/// First value broadcast by the countdown (then 2, 1, then red).
pub const COUNTDOWN_FROM: u32 = 3;

/// Interval between two countdown ticks, in milliseconds.
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// Shortest delay (in milliseconds) between red and green.
pub const GREEN_DELAY_MIN_MS: u64 = 2000;

/// Longest delay (in milliseconds) between red and green.
pub const GREEN_DELAY_MAX_MS: u64 = 5000;

/// Timing parameters of a round, injected into the match server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTiming {
    pub countdown_from: u32,
    pub countdown_tick: Duration,
    pub green_delay_min: Duration,
    pub green_delay_max: Duration,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            countdown_from: COUNTDOWN_FROM,
            countdown_tick: Duration::from_millis(COUNTDOWN_TICK_MS),
            green_delay_min: Duration::from_millis(GREEN_DELAY_MIN_MS),
            green_delay_max: Duration::from_millis(GREEN_DELAY_MAX_MS),
        }
    }
}

impl RoundTiming {
    /// Timing with a fixed red-to-green delay (no randomization).
    pub fn fixed(countdown_tick: Duration, green_delay: Duration) -> Self {
        Self {
            countdown_from: COUNTDOWN_FROM,
            countdown_tick,
            green_delay_min: green_delay,
            green_delay_max: green_delay,
        }
    }

    /// Draw the red-to-green delay uniformly from the configured bounds.
    pub fn draw_green_delay(&self) -> Duration {
        let min = self.green_delay_min.as_millis() as u64;
        let max = self.green_delay_max.as_millis() as u64;
        if max <= min {
            return self.green_delay_min;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}
