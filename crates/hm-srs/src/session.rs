//! A single pass over a review queue.

use hm_store::{ItemKey, RecordStore};
use serde::Serialize;

use crate::{
    queue::DueItem,
    scheduler::Scheduler,
    sm2::{Grade, ReviewResult},
};

/// Running count of answers given during a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTally {
    pub remembered: u32,
    pub forgotten: u32,
}

/// Outcome of grading the current item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedItem {
    pub key: ItemKey,
    pub grade: Grade,
    pub result: ReviewResult,
}

/// Walks a queue one item at a time, grading and advancing
#[derive(Debug, Clone)]
pub struct ReviewSession {
    queue: Vec<DueItem>,
    position: usize,
    tally: SessionTally,
}

impl ReviewSession {
    /// Start a session over `queue`
    pub fn new(queue: Vec<DueItem>) -> Self {
        Self {
            queue,
            position: 0,
            tally: SessionTally::default(),
        }
    }

    /// Item awaiting a grade, or `None` once the pass is over
    pub fn current(&self) -> Option<&DueItem> {
        self.queue.get(self.position)
    }

    /// Items left including the current one
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.position)
    }

    /// Whether every item has been graded or skipped
    pub fn is_finished(&self) -> bool {
        self.position >= self.queue.len()
    }

    /// Answers counted so far
    pub const fn tally(&self) -> SessionTally {
        self.tally
    }

    /// Grade the current item and move on to the next one
    pub fn grade<S>(
        &mut self,
        scheduler: &mut Scheduler,
        store: &mut S,
        grade: Grade,
    ) -> Option<GradedItem>
    where
        S: RecordStore + ?Sized,
    {
        let key = self.current()?.key.clone();
        let result = scheduler.submit_review(store, &key, grade);

        if grade.is_pass() {
            self.tally.remembered += 1;
        } else {
            self.tally.forgotten += 1;
        }
        self.position += 1;

        if self.is_finished() {
            tracing::info!(
                remembered = self.tally.remembered,
                forgotten = self.tally.forgotten,
                "Review session finished"
            );
        }

        Some(GradedItem { key, grade, result })
    }

    /// Move past the current item without grading it
    pub fn skip(&mut self) -> Option<&DueItem> {
        let skipped = self.queue.get(self.position)?;
        self.position += 1;
        Some(skipped)
    }
}
