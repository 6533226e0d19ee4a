use thiserror::Error;

/// Errors raised while moving review history in or out of its persisted form.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Malformed history JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Timestamp out of range: {0}")]
    Timestamp(i64),
}
