//! HTTP error mapping.
//!
//! Every failure leaves the service as `{ "error": message }` with a status
//! chosen by the error class: validation => 400, everything else => 500.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::BridgeError;
use crate::operators::{EvalError, EvalErrorKind};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request body or missing field
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// A blocking worker panicked or was cancelled
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Eval(e) => match e.kind() {
                EvalErrorKind::Validation => StatusCode::BAD_REQUEST,
                EvalErrorKind::Fault => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Bridge(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
