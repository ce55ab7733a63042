use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::db::StorageError;

/// Request-time failures, mapped onto HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Validation(Vec<String>),
    BadRequest(String),
    Forbidden,
    RateLimited(u64),
    Storage(StorageError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors.join("; ")),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::RateLimited(secs) => write!(f, "Rate Limited: retry after {secs}s"),
            AppError::Storage(err) => write!(f, "Storage Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                tracing::debug!(?errors, "Submission rejected");
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(json!({ "error": "Validation failed", "details": errors })),
                )
                    .into_response()
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": msg }))).into_response()
            }
            AppError::Forbidden => {
                (StatusCode::FORBIDDEN, axum::Json(json!({ "error": "Forbidden" }))).into_response()
            }
            AppError::RateLimited(retry_after) => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    axum::Json(json!({
                        "error": format!("Too many submissions. Retry after {retry_after}s")
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            AppError::Storage(err) => {
                tracing::error!("Storage error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

/// Failures that stop the process before it starts accepting requests.
#[derive(Debug)]
pub enum StartupError {
    Config(String),
    Storage(StorageError),
    Io(std::io::Error),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Config(msg) => write!(f, "Invalid configuration: {msg}"),
            StartupError::Storage(err) => write!(f, "Storage unavailable: {err}"),
            StartupError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<StorageError> for StartupError {
    fn from(err: StorageError) -> Self {
        StartupError::Storage(err)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(err: std::io::Error) -> Self {
        StartupError::Io(err)
    }
}
