pub mod cors;
pub mod request_id;

use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::{config::Environment, metrics};

/// Wrap `router` in the standard stack: request ids, metrics, tracing and CORS
pub fn apply<S>(
    router: Router<S>,
    environment: Environment,
    allowed_origins: Vec<String>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(cors::create_cors_layer(environment, allowed_origins))
        .layer(TraceLayer::new_for_http().make_span_with(request_id::make_span))
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(request_id::propagate_layer())
        .layer(request_id::set_layer())
}
