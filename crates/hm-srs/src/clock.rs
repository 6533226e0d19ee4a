//! Wall-clock abstraction so scheduling can be tested with frozen time.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Source of the current time as Unix epoch milliseconds
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds
    fn now_millis(&self) -> i64;
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    /// Create a clock frozen at `now` (epoch milliseconds)
    pub const fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by a (possibly fractional) number of days
    pub fn advance_days(&self, days: f64) {
        let delta = (days * MS_PER_DAY as f64).round() as i64;
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
