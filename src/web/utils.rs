//! Shared helpers for the web layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, axum::Json(body)).into_response()
}
