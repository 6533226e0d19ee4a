use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hm_store::{ItemKey, StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown vocabulary item: {0}")]
    UnknownItem(ItemKey),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnknownItem(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
