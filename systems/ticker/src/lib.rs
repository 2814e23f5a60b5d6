#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step scheduling system that turns elapsed frame time into whole
//! simulation ticks.

use std::time::Duration;

use tracing::warn;

/// Configuration parameters required to construct the ticker.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    tick_interval: Duration,
    max_catch_up: u32,
}

impl Config {
    /// Creates a configuration using the provided cadence and the maximum
    /// number of ticks a single frame may release.
    #[must_use]
    pub const fn new(tick_interval: Duration, max_catch_up: u32) -> Self {
        Self {
            tick_interval,
            max_catch_up,
        }
    }
}

/// Pure system that releases ticks at a fixed cadence regardless of how
/// irregularly frames arrive.
#[derive(Debug)]
pub struct Ticker {
    tick_interval: Duration,
    max_catch_up: u32,
    accumulator: Duration,
}

impl Ticker {
    /// Creates a new ticker using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            max_catch_up: config.max_catch_up,
            accumulator: Duration::ZERO,
        }
    }

    /// Duration of simulated time covered by one tick.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Time carried over toward the next tick.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Accumulates `elapsed` frame time and returns how many ticks are due.
    ///
    /// Partial intervals carry over to later frames. When more than
    /// `max_catch_up` ticks are due the excess is discarded instead of
    /// queueing an ever-growing backlog.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.tick_interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut ticks = 0;
        while self.accumulator >= self.tick_interval {
            if ticks == self.max_catch_up {
                let backlog_ms = u64::try_from(self.accumulator.as_millis()).unwrap_or(u64::MAX);
                warn!(backlog_ms, "tick backlog dropped");
                self.accumulator = Duration::ZERO;
                break;
            }
            self.accumulator -= self.tick_interval;
            ticks += 1;
        }
        ticks
    }
}
