//! API error type and its HTTP mapping.
//!
//! Every error body has the shape `{"error": "<message>"}`. Upstream and
//! internal failures are logged in full and answered with a sanitized
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cinematch_engine::EngineError;
use serde_json::json;
use thiserror::Error;

/// Message for a request without a usable `movie` field.
pub const MISSING_MOVIE: &str = "Missing 'movie' parameter";

/// Message for a title that is not in the catalog.
pub const MOVIE_NOT_FOUND: &str = "Movie not found in dataset. Try another title.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// An upstream collaborator failed (500)
    #[error("Upstream service failed: {source_name}")]
    Upstream { source_name: String },

    /// Anything else (500)
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::BadRequest(msg),
            err if err.is_upstream() => {
                log::error!("Upstream failure: {}", err);
                ApiError::Upstream {
                    source_name: err.source_name().unwrap_or("upstream").to_string(),
                }
            }
            err => {
                log::error!("Request failed: {}", err);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
