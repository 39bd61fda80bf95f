//! Axum router construction.
//!
//! Assembles all routes into a single [`Router`] with CORS and request
//! tracing middleware.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// An empty `cors_origins` allows any origin. Origins that are not valid
/// header values are skipped with a warning.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(cors_origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        // Leaderboard (rate limited)
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route(
            "/api/leaderboard/{window}",
            get(handlers::get_window_leaderboard),
        )
        .route("/api/top", get(handlers::get_top))
        .route("/api/totals", get(handlers::get_totals))
        // Identity lookups
        .route("/api/user-stats", get(handlers::get_user_stats))
        .route("/api/user/{username}", get(handlers::get_user))
        // Liveness
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn allow_origin(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() {
        return AllowOrigin::from(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    AllowOrigin::list(parsed)
}
