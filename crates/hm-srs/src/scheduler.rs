//! Review controller: turns grades into stored scheduling state.

use std::{fmt, sync::Arc};

use hm_store::{ItemKey, RecordStore, ReviewRecord, Sm2State, VocabularyItem};
use serde::{Deserialize, Serialize};

use crate::{
    clock::{Clock, MS_PER_DAY, SystemClock},
    jitter::{FixedJitter, Jitter, RandomJitter},
    queue::{self, DEFAULT_QUEUE_LIMIT, DueItem},
    sm2::{self, Grade, ReviewResult},
};

/// Intervals each answer would produce, shown before the learner picks one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPreview {
    pub fail: u32,
    pub hard: u32,
    pub easy: u32,
}

/// Spaced-repetition scheduler.
///
/// Holds the injected clock and random source; review history and vocabulary are
/// passed into each call, so independent schedulers can run side by side.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    jitter: Box<dyn Jitter>,
    queue_limit: usize,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.clock.now_millis())
            .field("queue_limit", &self.queue_limit)
            .finish_non_exhaustive()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Box::new(RandomJitter::from_entropy()))
    }
}

impl Scheduler {
    /// Create a scheduler with an explicit clock and random source
    pub fn new(clock: Arc<dyn Clock>, jitter: Box<dyn Jitter>) -> Self {
        Self {
            clock,
            jitter,
            queue_limit: DEFAULT_QUEUE_LIMIT,
        }
    }

    /// Override the default queue length
    #[must_use]
    pub const fn with_queue_limit(mut self, limit: usize) -> Self {
        self.queue_limit = limit;
        self
    }

    /// Configured queue length
    pub const fn queue_limit(&self) -> usize {
        self.queue_limit
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Items due now, capped at the configured limit
    pub fn queue<S>(&self, items: &[VocabularyItem], store: &S) -> Vec<DueItem>
    where
        S: RecordStore + ?Sized,
    {
        self.queue_with_limit(items, store, self.queue_limit)
    }

    /// Items due now, capped at `limit`
    pub fn queue_with_limit<S>(
        &self,
        items: &[VocabularyItem],
        store: &S,
        limit: usize,
    ) -> Vec<DueItem>
    where
        S: RecordStore + ?Sized,
    {
        queue::build_queue(items, store, self.now(), limit)
    }

    /// Number of items due now, uncapped
    pub fn due_count<S>(&self, items: &[VocabularyItem], store: &S) -> usize
    where
        S: RecordStore + ?Sized,
    {
        queue::count_due(items, store, self.now())
    }

    /// Record a grading of `key` and reschedule it.
    ///
    /// Creates the review record and its SM-2 state on first use, updates the
    /// attempt counters, and stores the next review time.
    pub fn submit_review<S>(&mut self, store: &mut S, key: &ItemKey, grade: Grade) -> ReviewResult
    where
        S: RecordStore + ?Sized,
    {
        let now = self.now();
        let mut record = store.record(key).unwrap_or_else(|| ReviewRecord::new(now));
        let prior = record.sm2.unwrap_or_default();

        let result = sm2::calculate(
            grade,
            &prior,
            record.last_review_at(),
            now,
            self.jitter.as_mut(),
        );

        record.sm2 = Some(Sm2State {
            interval: result.interval,
            repetitions: result.repetitions,
            ef: result.ef,
            next_review: Some(now.saturating_add(i64::from(result.interval) * MS_PER_DAY)),
        });
        record.last_review = Some(now);
        record.attempts = record.attempts.saturating_add(1);
        if grade.is_pass() {
            record.correct = record.correct.saturating_add(1);
        }

        tracing::debug!(
            key = %key,
            grade = grade.value(),
            interval = result.interval,
            repetitions = result.repetitions,
            ef = result.ef,
            "Review submitted"
        );

        store.save(key.clone(), record);
        result
    }

    /// Intervals a fail, hard or easy answer would produce for `key`.
    ///
    /// Read-only. The preview is computed without fuzz so that repeated calls
    /// agree; the interval actually stored may differ by up to 5%.
    pub fn preview_next_intervals<S>(&self, store: &S, key: &ItemKey) -> IntervalPreview
    where
        S: RecordStore + ?Sized,
    {
        let now = self.now();
        let record = store.record(key);
        let last_review = record.as_ref().and_then(ReviewRecord::last_review_at);
        let prior = record.and_then(|r| r.sm2).unwrap_or_default();

        let interval_for = |grade| {
            let mut no_fuzz = FixedJitter::NONE;
            sm2::calculate(grade, &prior, last_review, now, &mut no_fuzz).interval
        };

        IntervalPreview {
            fail: interval_for(Grade::FAIL),
            hard: interval_for(Grade::HARD),
            easy: interval_for(Grade::EASY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use hm_store::{ItemId, MemoryStore};

    const START: i64 = 1_700_000_000_000;

    fn scheduler() -> (Arc<FixedClock>, Scheduler) {
        let clock = Arc::new(FixedClock::new(START));
        let scheduler = Scheduler::new(clock.clone(), Box::new(FixedJitter::NONE));
        (clock, scheduler)
    }

    fn key(id: i64) -> ItemKey {
        ItemKey::from(id)
    }

    #[test]
    fn test_submit_creates_record() {
        let (_, mut scheduler) = scheduler();
        let mut store = MemoryStore::new();

        let result = scheduler.submit_review(&mut store, &key(1), Grade::EASY);
        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 1);

        let record = store.get(&key(1)).unwrap();
        assert_eq!(record.attempts, 1);
        assert_eq!(record.correct, 1);
        assert_eq!(record.last_review, Some(START));

        let sm2 = record.sm2.unwrap();
        assert_eq!(sm2.interval, 1);
        assert_eq!(sm2.next_review, Some(START + MS_PER_DAY));
        assert!(sm2.ef > 2.5);
    }

    #[test]
    fn test_failed_review_counts_attempt_only() {
        let (_, mut scheduler) = scheduler();
        let mut store = MemoryStore::new();

        scheduler.submit_review(&mut store, &key(1), Grade::FAIL);
        scheduler.submit_review(&mut store, &key(1), Grade::clamped(2));

        let record = store.get(&key(1)).unwrap();
        assert_eq!(record.attempts, 2);
        assert_eq!(record.correct, 0);
        assert_eq!(record.sm2.unwrap().repetitions, 0);
    }

    #[test]
    fn test_promotes_unscheduled_record() {
        let (_, mut scheduler) = scheduler();
        let mut store = MemoryStore::new();
        store.save(
            key(3),
            ReviewRecord {
                attempts: 4,
                correct: 3,
                last_review: Some(START - MS_PER_DAY),
                sm2: None,
            },
        );

        scheduler.submit_review(&mut store, &key(3), Grade::GOOD);

        let record = store.get(&key(3)).unwrap();
        assert_eq!(record.attempts, 5);
        assert_eq!(record.correct, 4);
        assert_eq!(record.sm2.unwrap().repetitions, 1);
    }

    #[test]
    fn test_review_cycle_grows_interval() {
        let (clock, mut scheduler) = scheduler();
        let mut store = MemoryStore::new();
        let k = key(7);

        let first = scheduler.submit_review(&mut store, &k, Grade::GOOD);
        assert_eq!(first.interval, 1);

        clock.advance_days(1.0);
        let second = scheduler.submit_review(&mut store, &k, Grade::GOOD);
        assert_eq!(second.interval, 6);

        clock.advance_days(6.0);
        let third = scheduler.submit_review(&mut store, &k, Grade::GOOD);
        // 6 * 2.5
        assert_eq!(third.interval, 15);
        assert_eq!(third.repetitions, 3);

        let sm2 = store.get(&k).unwrap().sm2.unwrap();
        assert_eq!(sm2.next_review, Some(clock.now_millis() + 15 * MS_PER_DAY));
    }

    #[test]
    fn test_submitted_item_leaves_queue_until_due() {
        let (clock, mut scheduler) = scheduler();
        let mut store = MemoryStore::new();
        let items = vec![VocabularyItem::new(Some(ItemId::Number(1)), "나무")];

        store.save(key(1), ReviewRecord::new(START));
        assert_eq!(scheduler.due_count(&items, &store), 1);

        scheduler.submit_review(&mut store, &key(1), Grade::GOOD);
        assert!(scheduler.queue(&items, &store).is_empty());

        clock.advance_days(1.0);
        assert_eq!(scheduler.queue(&items, &store).len(), 1);
    }

    #[test]
    fn test_preview_is_read_only_and_idempotent() {
        let (clock, mut scheduler) = scheduler();
        let mut store = MemoryStore::new();
        let k = key(2);

        scheduler.submit_review(&mut store, &k, Grade::GOOD);
        clock.advance_days(1.0);
        scheduler.submit_review(&mut store, &k, Grade::GOOD);
        let before = store.snapshot();
        store.drain_dirty();

        let first = scheduler.preview_next_intervals(&store, &k);
        let second = scheduler.preview_next_intervals(&store, &k);

        assert_eq!(first, second);
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.dirty_keys().count(), 0);
        assert_eq!(first.fail, 1);
        // 6 * 1.2 and 6 * 2.5 * 1.3
        assert_eq!(first.hard, 7);
        assert_eq!(first.easy, 20);
    }

    #[test]
    fn test_preview_for_unknown_item() {
        let (_, scheduler) = scheduler();
        let store = MemoryStore::new();

        let preview = scheduler.preview_next_intervals(&store, &key(99));
        assert_eq!(
            preview,
            IntervalPreview {
                fail: 1,
                hard: 1,
                easy: 1
            }
        );
    }

    #[test]
    fn test_queue_limit() {
        let (_, scheduler) = scheduler();
        let scheduler = scheduler.with_queue_limit(2);
        let mut store = MemoryStore::new();
        let items: Vec<_> = (1..=4)
            .map(|i| VocabularyItem::new(Some(ItemId::Number(i)), "w"))
            .collect();
        for i in 1..=4 {
            store.save(key(i), ReviewRecord::new(START));
        }

        assert_eq!(scheduler.queue_limit(), 2);
        assert_eq!(scheduler.queue(&items, &store).len(), 2);
        assert_eq!(scheduler.queue_with_limit(&items, &store, 10).len(), 4);
        assert_eq!(scheduler.due_count(&items, &store), 4);
    }
}
