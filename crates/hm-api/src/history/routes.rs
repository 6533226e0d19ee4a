//! Import, export and sync of the raw review history.
//!
//! These endpoints are how the client persists progress: it exports the flat
//! snapshot to local storage, pushes drained rows to the remote store, and
//! imports whatever it pulls back.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use hm_store::{ItemKey, ProgressRow, Snapshot};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

/// Create the history routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/history", get(export_history).put(import_history))
        .route("/history/{key}", delete(reset_item))
        .route("/sync/drain", post(drain_changes))
        .route("/sync/pull", post(merge_pulled_rows))
}

async fn export_history(State(state): State<ApiState>) -> Json<Snapshot> {
    let desk = state.desk.lock().await;
    Json(desk.history.snapshot())
}

/// Replace the whole history with the uploaded snapshot
async fn import_history(
    State(state): State<ApiState>,
    Json(snapshot): Json<Snapshot>,
) -> StatusCode {
    let mut desk = state.desk.lock().await;
    desk.history.replace(snapshot);
    StatusCode::NO_CONTENT
}

/// Forget everything about one item; it becomes unseen again
async fn reset_item(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let key = ItemKey::from(key);
    let mut desk = state.desk.lock().await;

    match desk.history.remove(&key) {
        Some(_) => {
            tracing::info!(key = %key, "Review history reset");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::UnknownItem(key)),
    }
}

/// Rows changed since the previous drain, flattened for the remote progress table.
///
/// The dirty set is only cleared once every row converted.
async fn drain_changes(State(state): State<ApiState>) -> Result<Json<Vec<ProgressRow>>, ApiError> {
    let mut desk = state.desk.lock().await;

    let rows = desk
        .history
        .dirty_keys()
        .filter_map(|key| Some((key, desk.history.get(key)?)))
        .map(|(key, record)| ProgressRow::from_record(key.clone(), record))
        .collect::<Result<Vec<_>, _>>()?;
    desk.history.drain_dirty();

    tracing::debug!(rows = rows.len(), "Drained pending history changes");
    Ok(Json(rows))
}

#[derive(Debug, Serialize)]
struct PullSummary {
    merged: usize,
    skipped: usize,
}

/// Merge rows pulled from the remote progress table.
///
/// Rows for items missing from the loaded vocabulary are skipped; the rest
/// overwrite the local record for their key.
async fn merge_pulled_rows(
    State(state): State<ApiState>,
    Json(rows): Json<Vec<ProgressRow>>,
) -> Json<PullSummary> {
    let total = rows.len();
    let known = rows
        .into_iter()
        .map(ProgressRow::into_record)
        .filter(|(key, _)| state.vocabulary.contains(key))
        .collect::<Vec<_>>();

    let mut desk = state.desk.lock().await;
    let merged = desk.history.merge_pulled(known);

    tracing::info!(merged, skipped = total - merged, "Pulled remote history");
    Json(PullSummary {
        merged,
        skipped: total - merged,
    })
}
