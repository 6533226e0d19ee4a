//! Modified SM-2 interval calculation.
//!
//! Grades (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but the answer was recognised
//! - 2: Incorrect, but the answer seemed easy once shown
//! - 3: Correct with serious difficulty ("hard")
//! - 4: Correct after hesitation ("good")
//! - 5: Perfect recall ("easy")
//!
//! Departures from textbook SM-2:
//! - a first success on an item that already carries an interval grows it by 20%
//!   instead of restarting at one day;
//! - reviews done late count the real elapsed time as the retention interval;
//! - mature items (interval over 10 days) keep 20% of their interval on failure;
//! - intervals above 2 days get a ±5% fuzz so items don't bunch up on one day.

use hm_store::{MIN_EASE_FACTOR, Sm2State};
use serde::{Deserialize, Serialize};

use crate::{clock::MS_PER_DAY, jitter::Jitter};

/// Failed items with an interval above this many days only lose part of it
const MATURE_INTERVAL_DAYS: f64 = 10.0;

/// Share of a mature interval kept after a failure
const LAPSE_RETENTION: f64 = 0.2;

/// Growth factor for a "hard" pass and for a first pass on a carried-over interval
const HARD_MULTIPLIER: f64 = 1.2;

/// Extra growth for an "easy" pass on a mature item
const EASY_BONUS: f64 = 1.3;

/// Minimum interval after the second consecutive success
const SECOND_STEP_DAYS: f64 = 6.0;

/// Intervals above this many days are fuzzed
const FUZZ_THRESHOLD_DAYS: f64 = 2.0;

/// Total width of the fuzz band (±5%)
const FUZZ_RANGE: f64 = 0.1;

/// Recall quality of one review, always within `[0, 5]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Grade(u8);

impl Grade {
    /// Total failure
    pub const FAIL: Self = Self(0);
    /// Correct with serious difficulty
    pub const HARD: Self = Self(3);
    /// Correct after hesitation
    pub const GOOD: Self = Self(4);
    /// Perfect recall
    pub const EASY: Self = Self(5);

    /// Build a grade, clamping out-of-range values into `[0, 5]`
    pub fn clamped(grade: i64) -> Self {
        Self(grade.clamp(0, 5) as u8)
    }

    /// Numeric value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this grade counts as a successful recall
    pub const fn is_pass(self) -> bool {
        self.0 >= 3
    }
}

impl From<i64> for Grade {
    fn from(grade: i64) -> Self {
        Self::clamped(grade)
    }
}

impl From<i32> for Grade {
    fn from(grade: i32) -> Self {
        Self::clamped(i64::from(grade))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

/// New scheduling values produced by one grading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Days until the next review
    pub interval: u32,
    /// Consecutive successful reviews
    pub repetitions: u32,
    /// Updated ease factor
    pub ef: f64,
}

/// Compute the next SM-2 values for an item graded `grade` at `now`.
///
/// `prior` is re-validated before use, so state loaded from damaged storage is
/// repaired rather than propagated. `last_review` (epoch milliseconds) enables
/// lateness compensation on passing grades. The only non-determinism is the fuzz
/// drawn from `jitter`.
pub fn calculate(
    grade: Grade,
    prior: &Sm2State,
    last_review: Option<i64>,
    now: i64,
    jitter: &mut dyn Jitter,
) -> ReviewResult {
    let prior = prior.sanitized();
    let g = f64::from(grade.value());
    let ef = prior.ef;
    let interval = f64::from(prior.interval);

    // pre-epoch and zero timestamps are storage damage, not a real last review
    let effective_interval = match last_review.filter(|&t| t > 0) {
        Some(last) if grade.is_pass() => {
            let days_since_last = now.saturating_sub(last) as f64 / MS_PER_DAY as f64;
            if days_since_last > interval {
                days_since_last
            } else {
                interval
            }
        }
        _ => interval,
    };

    let (next_interval, repetitions) = if grade.is_pass() {
        let next = match prior.repetitions {
            0 if interval > 1.0 => (interval * HARD_MULTIPLIER).round(),
            0 => 1.0,
            1 => (effective_interval * ef).round().max(SECOND_STEP_DAYS),
            _ if grade == Grade::HARD => (effective_interval * HARD_MULTIPLIER).round(),
            _ if grade == Grade::EASY => (effective_interval * ef * EASY_BONUS).round(),
            _ => (effective_interval * ef).round(),
        };
        (next.max(1.0), prior.repetitions.saturating_add(1))
    } else if interval > MATURE_INTERVAL_DAYS {
        ((interval * LAPSE_RETENTION).round().max(1.0), 0)
    } else {
        (1.0, 0)
    };

    let ef = (ef + (0.1 - (5.0 - g) * (0.08 + (5.0 - g) * 0.02))).max(MIN_EASE_FACTOR);

    let next_interval = if next_interval > FUZZ_THRESHOLD_DAYS {
        let fuzz = jitter.sample() * FUZZ_RANGE - FUZZ_RANGE / 2.0;
        (next_interval * (1.0 + fuzz)).round()
    } else {
        next_interval
    };

    ReviewResult {
        interval: next_interval as u32,
        repetitions,
        ef,
    }
}
