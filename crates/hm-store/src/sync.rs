//! Row shape exchanged with the remote progress table.
//!
//! The remote store keeps one flat row per `(user, word)`; the SM-2 fields are
//! spread into columns and timestamps travel as RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::StoreError,
    models::{DEFAULT_EASE_FACTOR, ItemKey, ReviewRecord, Sm2State},
};

/// One item's progress as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRow {
    pub word_id: ItemKey,
    pub attempts: u32,
    pub correct: u32,
    pub last_review: Option<DateTime<Utc>>,
    pub sm2_interval: Option<u32>,
    pub sm2_repetitions: Option<u32>,
    pub sm2_ef: Option<f64>,
    pub sm2_next_review: Option<DateTime<Utc>>,
}

impl ProgressRow {
    /// Flatten a local record for upload. Missing SM-2 state is written as defaults.
    pub fn from_record(key: ItemKey, record: &ReviewRecord) -> Result<Self, StoreError> {
        let sm2 = record.sm2.unwrap_or_default();

        Ok(Self {
            word_id: key,
            attempts: record.attempts,
            correct: record.correct,
            last_review: record.last_review_at().map(to_datetime).transpose()?,
            sm2_interval: Some(sm2.interval),
            sm2_repetitions: Some(sm2.repetitions),
            sm2_ef: Some(sm2.ef),
            sm2_next_review: sm2
                .next_review
                .filter(|&t| t != 0)
                .map(to_datetime)
                .transpose()?,
        })
    }

    /// Rebuild a local record from a downloaded row.
    ///
    /// Pulled rows always carry SM-2 state; null columns take their defaults.
    pub fn into_record(self) -> (ItemKey, ReviewRecord) {
        let sm2 = Sm2State {
            interval: self.sm2_interval.unwrap_or(0),
            repetitions: self.sm2_repetitions.unwrap_or(0),
            ef: self.sm2_ef.unwrap_or(DEFAULT_EASE_FACTOR),
            next_review: self.sm2_next_review.map(|t| t.timestamp_millis()),
        };

        let record = ReviewRecord {
            attempts: self.attempts,
            correct: self.correct,
            last_review: self.last_review.map(|t| t.timestamp_millis()),
            sm2: Some(sm2),
        };

        (self.word_id, record)
    }
}

fn to_datetime(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis).ok_or(StoreError::Timestamp(millis))
}
