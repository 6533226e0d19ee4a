//! Review record storage for Hanmal.
//!
//! This crate owns the per-item review history: the data model, the flat JSON
//! shape it is persisted in, and the key-value contract the scheduler reads and
//! writes through. Durable storage is left to the caller.

pub mod error;
pub mod models;
pub mod store;
pub mod sync;

pub use error::StoreError;
pub use models::{
    DEFAULT_EASE_FACTOR, ItemId, ItemKey, MIN_EASE_FACTOR, ReviewRecord, Sm2State, VocabularyItem,
};
pub use store::{MemoryStore, RecordStore, Snapshot};
pub use sync::ProgressRow;
