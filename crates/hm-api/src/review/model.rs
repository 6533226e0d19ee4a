use hm_srs::{
    Grade, IntervalPreview, ReviewResult, format::format_interval, stats::StageDistribution,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QueueParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DueCount {
    pub due: usize,
}

/// Grade submitted for one item; out-of-range values are clamped, not rejected
#[derive(Debug, Deserialize)]
pub struct ReviewSubmission {
    pub grade: Grade,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub result: ReviewResult,
    /// Epoch milliseconds at which the item is due again
    pub next_review: i64,
    /// Feedback line, absent when the item is due again within a day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewLabels {
    pub fail: String,
    pub hard: String,
    pub easy: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub intervals: IntervalPreview,
    pub labels: PreviewLabels,
}

impl From<IntervalPreview> for PreviewResponse {
    fn from(intervals: IntervalPreview) -> Self {
        Self {
            labels: PreviewLabels {
                fail: format_interval(intervals.fail),
                hard: format_interval(intervals.hard),
                easy: format_interval(intervals.easy),
            },
            intervals,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub accuracy: u32,
    pub mastered: usize,
    pub due: usize,
    pub distribution: StageDistribution,
    pub average_stability: f64,
    pub retention: RetentionCurves,
}

/// Forgetting curves for the coming week, in percent, one point per day
#[derive(Debug, Serialize)]
pub struct RetentionCurves {
    /// Curve of an item at the baseline stability
    pub baseline: Vec<f64>,
    /// Curve at the learner's average stability
    pub learner: Vec<f64>,
}
