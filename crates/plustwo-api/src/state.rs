//! Shared application state for the API server.
//!
//! [`AppState`] holds the query services, the per-client rate limiter,
//! and the pagination bounds. It is wrapped in an [`Arc`](std::sync::Arc)
//! and injected via Axum's `State` extractor.

use plustwo_core::config::PaginationConfig;
use plustwo_core::{
    IdentityService, LeaderboardService, QueryError, RateLimitPolicy, RateLimiter, ServiceConfig,
};
use plustwo_db::ScoreStore;

use crate::client::ClientToken;

/// Shared state for the Axum application.
pub struct AppState {
    /// Ranked and windowed queries.
    pub leaderboard: LeaderboardService,
    /// Single-identity lookups.
    pub identities: IdentityService,
    /// Per-client request counters. The only mutable shared state.
    pub rate_limiter: RateLimiter,
    /// Limit applied to the leaderboard endpoints.
    pub rate_limit: RateLimitPolicy,
    /// Page size defaults and bounds.
    pub pagination: PaginationConfig,
    /// Whether forwarding headers identify the client.
    pub trust_forwarded_headers: bool,
}

impl AppState {
    /// Build state over `store` using the limits in `config`.
    pub fn new(store: ScoreStore, config: &ServiceConfig) -> Self {
        Self {
            leaderboard: LeaderboardService::new(store.clone()),
            identities: IdentityService::new(store),
            rate_limiter: RateLimiter::new(config.rate_limit.max_tracked_tokens),
            rate_limit: RateLimitPolicy {
                limit: config.rate_limit.requests_per_interval,
                interval: config.rate_limit.interval(),
            },
            pagination: config.pagination,
            trust_forwarded_headers: config.server.trust_forwarded_headers,
        }
    }

    /// Count one request from `client` against the leaderboard limit.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::RateLimitExceeded`] if the client's window
    /// is already full. Nothing else is touched in that case.
    pub fn admit(&self, client: &ClientToken) -> Result<(), QueryError> {
        self.rate_limiter
            .check_policy(client.as_str(), self.rate_limit)
            .map_err(|limited| {
                tracing::debug!(
                    client = %client,
                    retry_after_secs = limited.retry_after.as_secs(),
                    "Rate limit exceeded"
                );
                QueryError::from(limited)
            })
    }
}
