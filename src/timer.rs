//! A wall-clock stopwatch for timing batches of tree operations.
//!
//! # Examples
//!
//! ```
//! use avl_range::Timer;
//!
//! let timer = Timer::started();
//! let sum: u64 = (0..1_000).sum();
//!
//! assert_eq!(sum, 499_500);
//! assert!(timer.elapsed_seconds() >= 0.0);
//! ```

use std::time::{Duration, Instant};

const NANOSECONDS_PER_SECOND: f64 = 1e9;
const NANOSECONDS_PER_MILLISECOND: f64 = 1e6;

/// Measures the time since it was last (re)started, with nanosecond resolution.
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    start: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::started()
    }
}

impl Timer {
    /// A timer that starts counting now.
    pub fn started() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Resets the starting point to now.
    pub fn start(&mut self) {
        self.start = Instant::now();
    }

    /// Time since the last start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whole nanoseconds since the last start.
    pub fn elapsed_nanoseconds(&self) -> u128 {
        self.elapsed().as_nanos()
    }

    /// Milliseconds since the last start.
    pub fn elapsed_milliseconds(&self) -> f64 {
        // Precision loss only matters past ~104 days.
        #[allow(clippy::cast_precision_loss)]
        let nanos = self.elapsed_nanoseconds() as f64;
        nanos / NANOSECONDS_PER_MILLISECOND
    }

    /// Seconds since the last start.
    pub fn elapsed_seconds(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let nanos = self.elapsed_nanoseconds() as f64;
        nanos / NANOSECONDS_PER_SECOND
    }
}
