//! Error taxonomy for leaderboard queries and identity lookups.
//!
//! Every failure a caller can see falls into one stable category (see
//! [`QueryError::category`]) so the HTTP boundary can map it without
//! inspecting messages.

use plustwo_db::DbError;

use crate::rate_limit::RateLimitExceeded;

/// Errors produced by the query services.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The caller's token used up its window. Never retried here.
    #[error(transparent)]
    RateLimitExceeded(#[from] RateLimitExceeded),

    /// Malformed pagination, unknown window, or missing identity.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The identity is not in the store. An expected outcome.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store could not be reached or answered too slowly.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),

    /// The store answered with an unexpected failure.
    #[error("store error: {0}")]
    Store(#[source] DbError),
}

/// Stable, caller-visible error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request itself was wrong.
    BadRequest,
    /// The requested identity does not exist.
    NotFound,
    /// The caller must slow down.
    RateLimited,
    /// Anything on the service side.
    Internal,
}

impl ErrorCategory {
    /// Wire name of the category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Internal => "internal",
        }
    }
}

impl QueryError {
    /// The caller-visible category of this error.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::RateLimitExceeded(_) => ErrorCategory::RateLimited,
            Self::InvalidQuery(_) => ErrorCategory::BadRequest,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::StoreUnavailable(_) | Self::Store(_) => ErrorCategory::Internal,
        }
    }
}

impl From<DbError> for QueryError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            Self::StoreUnavailable(err)
        } else {
            Self::Store(err)
        }
    }
}
