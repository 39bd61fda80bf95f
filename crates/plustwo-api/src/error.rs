//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies every failure a handler can produce and converts
//! it into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Error
//! bodies always have the shape `{ "error", "category", "status" }`.

use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use plustwo_core::{ErrorCategory, QueryError};
use plustwo_types::ParseWindowError;

/// Message sent for every internal failure. Store detail stays in the logs.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Message sent with every 429.
pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A query service failure.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The path named a window that does not exist.
    #[error("invalid query: {0}")]
    InvalidWindow(#[from] ParseWindowError),
}

impl ApiError {
    /// The stable category reported to the caller.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Query(err) => err.category(),
            Self::InvalidWindow(_) => ErrorCategory::BadRequest,
        }
    }

    const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Query(QueryError::RateLimitExceeded(limited)) => Some(limited.retry_after),
            _ => None,
        }
    }
}

const fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::BadRequest => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Whole seconds to wait, rounded up and never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait
        .as_secs()
        .saturating_add(u64::from(wait.subsec_nanos() > 0));
    secs.max(1)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let category = self.category();
        let status = status_for(category);

        let message = match category {
            ErrorCategory::Internal => {
                tracing::error!(error = %self, "Request failed");
                String::from(INTERNAL_MESSAGE)
            }
            ErrorCategory::RateLimited => String::from(RATE_LIMITED_MESSAGE),
            ErrorCategory::BadRequest | ErrorCategory::NotFound => self.to_string(),
        };

        let body = axum::Json(serde_json::json!({
            "error": message,
            "category": category.as_str(),
            "status": status.as_u16(),
        }));

        match self.retry_after() {
            Some(wait) => (
                status,
                [(header::RETRY_AFTER, retry_after_secs(wait).to_string())],
                body,
            )
                .into_response(),
            None => (status, body).into_response(),
        }
    }
}
