//! Aggregate progress figures derived from review history.

use std::collections::HashSet;

use hm_store::{RecordStore, ReviewRecord, VocabularyItem};
use serde::Serialize;

/// Stability assumed when no item has been reviewed past its first day
pub const BASELINE_STABILITY_DAYS: f64 = 2.5;

/// Items answered at least this often can count as mastered
const MASTERY_MIN_ATTEMPTS: u32 = 3;

/// Accuracy an item needs to count as mastered
const MASTERY_MIN_ACCURACY: f64 = 0.9;

/// How far along the vocabulary is, by current interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageDistribution {
    /// Never scheduled
    pub new: usize,
    /// Interval under 3 days
    pub learning: usize,
    /// Interval under 21 days
    pub consolidating: usize,
    /// Interval of 21 days or more
    pub learned: usize,
}

impl StageDistribution {
    /// Total number of distinct items counted
    pub const fn total(&self) -> usize {
        self.new + self.learning + self.consolidating + self.learned
    }
}

/// Overall share of correct answers as a whole percentage
pub fn accuracy_percent<'a>(records: impl IntoIterator<Item = &'a ReviewRecord>) -> u32 {
    let (attempts, correct) = records.into_iter().fold((0_u64, 0_u64), |(a, c), r| {
        (a + u64::from(r.attempts), c + u64::from(r.correct))
    });

    if attempts == 0 {
        0
    } else {
        (correct as f64 / attempts as f64 * 100.0).round() as u32
    }
}

/// Items answered at least three times with 90% accuracy or better
pub fn mastered_count<'a>(records: impl IntoIterator<Item = &'a ReviewRecord>) -> usize {
    records
        .into_iter()
        .filter(|r| r.attempts >= MASTERY_MIN_ATTEMPTS && r.accuracy() >= MASTERY_MIN_ACCURACY)
        .count()
}

/// Bucket every distinct vocabulary item by how long its current interval is
pub fn stage_distribution<S>(items: &[VocabularyItem], store: &S) -> StageDistribution
where
    S: RecordStore + ?Sized,
{
    let mut seen = HashSet::new();
    let mut dist = StageDistribution::default();

    for item in items {
        let key = item.key();
        if !seen.insert(key.clone()) {
            continue;
        }

        match store.record(&key).and_then(|r| r.sm2).map(|s| s.interval) {
            None | Some(0) => dist.new += 1,
            Some(i) if i < 3 => dist.learning += 1,
            Some(i) if i < 21 => dist.consolidating += 1,
            Some(_) => dist.learned += 1,
        }
    }

    dist
}

/// Mean interval, in days, over items that have been reviewed past their first day
pub fn average_stability<'a>(records: impl IntoIterator<Item = &'a ReviewRecord>) -> f64 {
    let (total, count) = records
        .into_iter()
        .filter_map(|r| r.sm2.map(|s| s.interval))
        .filter(|&interval| interval > 1)
        .fold((0_u64, 0_u32), |(t, c), interval| {
            (t + u64::from(interval), c + 1)
        });

    if count == 0 {
        BASELINE_STABILITY_DAYS
    } else {
        total as f64 / f64::from(count)
    }
}

/// Estimated recall, in percent, for each day from today to `days` out.
///
/// Uses the exponential forgetting curve `R = e^(-t / S)`.
pub fn retention_curve(stability: f64, days: u32) -> Vec<f64> {
    let stability = if stability.is_finite() && stability > 0.0 {
        stability
    } else {
        BASELINE_STABILITY_DAYS
    };

    (0..=days)
        .map(|t| (-f64::from(t) / stability).exp() * 100.0)
        .collect()
}
