//! API error responses

use std::any::Any;

use agrosense_core::CoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced to API clients as a JSON 500
#[derive(Debug, Error)]
pub enum ApiError {
    /// Scoring rejected its input or could not sample
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Any other server-side failure
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Turn a handler panic into the same JSON 500 as any other failure
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unexpected internal error".to_string()
    };
    ApiError::Internal(detail).into_response()
}
