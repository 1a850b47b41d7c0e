use std::any::Any;

use axum::{
    http::Uri,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Unmatched path or method under `/api`
pub async fn api_not_found() -> ApiError {
    ApiError::not_found("API endpoint not found")
}

/// Router-wide fallback
pub async fn not_found(uri: Uri) -> ApiError {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        api_not_found().await
    } else {
        ApiError::not_found("Route not found")
    }
}

/// Last-resort handler for a panic escaping a request handler
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(error = detail, "Unhandled error");

    ApiError::internal("Something went wrong").into_response()
}
