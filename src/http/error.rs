//! API errors
//!
//! Maps failures to status codes and a `{"errText": ...}` body. Missing
//! records and non-numeric ids become 404, bad input 400, everything else 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StoreError;

/// Error returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("record not found")]
    NotFound,

    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "errText")]
    pub err_text: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound | ApiError::InvalidId(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            // Only raised while encoding request data; decode failures are Corruption
            ApiError::Store(StoreError::FieldOverflow { .. })
            | ApiError::Store(StoreError::InvalidTimestamp(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Err: {}", self);
        } else {
            tracing::debug!("Err: {}", self);
        }

        let body = ErrorResponse {
            err_text: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
