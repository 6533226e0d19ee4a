use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use hm_srs::{DueItem, format::see_you_in, stats};
use hm_store::ItemKey;

use crate::{ApiState, error::ApiError, metrics, state::ReviewDesk};

use super::model::{
    DueCount, PreviewResponse, QueueParams, RetentionCurves, ReviewResponse, ReviewSubmission,
    StatsResponse,
};

/// Days covered by the retention curves in `/stats`
const RETENTION_DAYS: u32 = 7;

/// Create the review routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/review/queue", get(get_queue))
        .route("/review/count", get(get_due_count))
        .route("/review/{key}", post(submit_review))
        .route("/review/{key}/preview", get(preview_intervals))
        .route("/stats", get(get_stats))
}

/// Items due now, most overdue first
async fn get_queue(
    State(state): State<ApiState>,
    Query(params): Query<QueueParams>,
) -> Json<Vec<DueItem>> {
    let desk = state.desk.lock().await;
    let limit = params.limit.unwrap_or(desk.scheduler.queue_limit());

    Json(
        desk.scheduler
            .queue_with_limit(state.vocabulary.items(), &desk.history, limit),
    )
}

async fn get_due_count(State(state): State<ApiState>) -> Json<DueCount> {
    let desk = state.desk.lock().await;
    let due = desk
        .scheduler
        .due_count(state.vocabulary.items(), &desk.history);

    Json(DueCount { due })
}

/// Grade an item and reschedule it
async fn submit_review(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    Json(payload): Json<ReviewSubmission>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let key = ItemKey::from(key);
    state.vocabulary.ensure_known(&key)?;

    let mut desk = state.desk.lock().await;
    let ReviewDesk { scheduler, history } = &mut *desk;

    let result = scheduler.submit_review(history, &key, payload.grade);
    let next_review = history
        .get(&key)
        .and_then(|record| record.sm2)
        .and_then(|sm2| sm2.next_review)
        .unwrap_or_default();

    metrics::record_review(payload.grade.is_pass());

    Ok(Json(ReviewResponse {
        result,
        next_review,
        message: see_you_in(result.interval),
    }))
}

/// What each answer would do to the item's interval, without changing anything
async fn preview_intervals(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let key = ItemKey::from(key);
    state.vocabulary.ensure_known(&key)?;

    let desk = state.desk.lock().await;
    let preview = desk.scheduler.preview_next_intervals(&desk.history, &key);

    Ok(Json(preview.into()))
}

async fn get_stats(State(state): State<ApiState>) -> Json<StatsResponse> {
    let desk = state.desk.lock().await;
    let items = state.vocabulary.items();
    let records = || desk.history.records().map(|(_, record)| record);
    let average_stability = stats::average_stability(records());

    Json(StatsResponse {
        accuracy: stats::accuracy_percent(records()),
        mastered: stats::mastered_count(records()),
        due: desk.scheduler.due_count(items, &desk.history),
        distribution: stats::stage_distribution(items, &desk.history),
        average_stability,
        retention: RetentionCurves {
            baseline: stats::retention_curve(stats::BASELINE_STABILITY_DAYS, RETENTION_DAYS),
            learner: stats::retention_curve(average_stability, RETENTION_DAYS),
        },
    })
}
