//! Time management utilities
//!
//! The simulation advances in fixed ticks. A frame may run several ticks to
//! catch up after a slow frame; the accumulated time is clamped so a long
//! stall cannot trigger an unbounded burst of ticks.

use std::time::{Duration, Instant};

/// Default simulation rate in ticks per second
pub const DEFAULT_TICKS_PER_SECOND: u32 = 30;

/// Default cap on accumulated, not yet simulated time
pub const DEFAULT_MAX_ACCUMULATED: Duration = Duration::from_millis(200);

/// Fixed-step accumulator that converts wall-clock time into whole ticks
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick: Duration,
    max_accumulated: Duration,
    accumulated: Duration,
    tick_count: u64,
    last_frame: Option<Instant>,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_TICKS_PER_SECOND, DEFAULT_MAX_ACCUMULATED)
    }
}

impl FixedTimestep {
    /// Create a new fixed timestep running at `ticks_per_second`
    pub fn new(ticks_per_second: u32, max_accumulated: Duration) -> Self {
        let ticks_per_second = ticks_per_second.max(1);
        Self {
            tick: Duration::from_secs(1) / ticks_per_second,
            max_accumulated,
            accumulated: Duration::ZERO,
            tick_count: 0,
            last_frame: None,
        }
    }

    /// Duration of one simulation tick
    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// Time accumulated but not yet consumed by a tick
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Total number of ticks handed out so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Add `elapsed` wall-clock time and return how many ticks to run now.
    ///
    /// A tick is consumed only while strictly more than one tick of time is
    /// pending, so the remainder always stays in the accumulator.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated = (self.accumulated + elapsed).min(self.max_accumulated);

        let mut ticks = 0;
        while self.accumulated > self.tick {
            self.accumulated -= self.tick;
            ticks += 1;
        }

        self.tick_count += u64::from(ticks);
        ticks
    }

    /// Measure the time since the previous call and advance by it.
    ///
    /// The first call only starts the clock and returns zero ticks.
    pub fn advance_from_clock(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.duration_since(last));
        self.last_frame = Some(now);
        self.advance(elapsed)
    }

    /// Drop any pending time, e.g. after the simulation was paused
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.last_frame = None;
    }
}
