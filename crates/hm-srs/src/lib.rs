//! SRS (Spaced Repetition System) library for Hanmal
//!
//! This crate provides the modified SM-2 algorithm, due-queue selection and the
//! review controller that writes scheduling state back into a
//! [`hm_store::RecordStore`]. Time and randomness are injected so that every
//! result can be reproduced in tests.

pub mod clock;
pub mod format;
pub mod jitter;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod sm2;
pub mod stats;

pub use clock::{Clock, FixedClock, MS_PER_DAY, SystemClock};
pub use jitter::{FixedJitter, Jitter, RandomJitter};
pub use queue::{DEFAULT_QUEUE_LIMIT, DueItem, build_queue};
pub use scheduler::{IntervalPreview, Scheduler};
pub use session::{GradedItem, ReviewSession, SessionTally};
pub use sm2::{Grade, ReviewResult, calculate};
