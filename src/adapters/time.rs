//! Monotonic clock adapter.
//!
//! Implements [`TimePort`] on top of `std::time::Instant`.  Time is
//! reported as seconds since the adapter was created, so alarm dwell
//! times and the temperature cycle are immune to wall-clock jumps.

use std::time::Instant;

use crate::app::ports::TimePort;

pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimePort for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
