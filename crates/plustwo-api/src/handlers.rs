//! REST API endpoint handlers.
//!
//! Query parameters arrive untyped; pagination falls back to defaults
//! when a value is absent or not a positive integer, and oversized page
//! sizes are clamped. The leaderboard endpoints count against the
//! caller's rate limit before any store access; a malformed window is
//! rejected before it is counted.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/leaderboard` | All windows, tug-of-war, counts |
//! | `GET` | `/api/leaderboard/{window}` | One window's page |
//! | `GET` | `/api/top` | Top identities of all time |
//! | `GET` | `/api/totals` | Store-wide event totals |
//! | `GET` | `/api/user-stats` | One identity by `?username=` |
//! | `GET` | `/api/user/{username}` | One identity by path |
//! | `GET` | `/api/health` | Store liveness |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use plustwo_core::config::PaginationConfig;
use plustwo_types::page::DEFAULT_PAGE;
use plustwo_types::{
    EventTotals, LeaderboardOverview, LeaderboardPage, PageRequest, ScoreRecord, Window,
};

use crate::client::ClientToken;
use crate::error::ApiError;
use crate::state::AppState;

/// Rows returned by `/api/top` when no limit is given.
pub const DEFAULT_TOP_LIMIT: u32 = 10;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Pagination parameters shared by the leaderboard endpoints.
#[derive(Debug, Default, serde::Deserialize)]
pub struct PageQuery {
    /// 1-indexed page number.
    pub page: Option<String>,
    /// Rows per page.
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// Query parameters for `GET /api/top`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct TopQuery {
    /// Number of identities to return.
    pub limit: Option<String>,
}

/// Query parameters for `GET /api/user-stats`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct UserStatsQuery {
    /// Identity to look up, in any case.
    pub username: Option<String>,
}

/// Parse a strictly positive integer, ignoring anything else.
fn positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Resolve untyped pagination into a valid [`PageRequest`].
pub fn resolve_page(query: &PageQuery, bounds: PaginationConfig) -> PageRequest {
    let page = positive(query.page.as_deref()).unwrap_or(DEFAULT_PAGE);
    let page_size = positive(query.page_size.as_deref())
        .unwrap_or(bounds.default_page_size)
        .min(bounds.max_page_size);
    PageRequest::new(page, page_size).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// The same page of every window, plus tug-of-war and window counts.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    client: ClientToken,
    Query(params): Query<PageQuery>,
) -> Result<Json<LeaderboardOverview>, ApiError> {
    state.admit(&client)?;
    let page = resolve_page(&params, state.pagination);
    let overview = state.leaderboard.get_overview(page).await?;
    Ok(Json(overview))
}

/// One page of a single window.
pub async fn get_window_leaderboard(
    State(state): State<Arc<AppState>>,
    client: ClientToken,
    Path(window): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Json<LeaderboardPage>, ApiError> {
    let window: Window = window.parse()?;
    state.admit(&client)?;
    let page = resolve_page(&params, state.pagination);
    let page = state.leaderboard.get_page(window, page).await?;
    Ok(Json(page))
}

/// Top identities of all time.
pub async fn get_top(
    State(state): State<Arc<AppState>>,
    client: ClientToken,
    Query(params): Query<TopQuery>,
) -> Result<Json<LeaderboardPage>, ApiError> {
    state.admit(&client)?;
    let limit = positive(params.limit.as_deref())
        .unwrap_or(DEFAULT_TOP_LIMIT)
        .min(state.pagination.max_page_size);
    Ok(Json(state.leaderboard.get_top(limit).await?))
}

/// Store-wide event totals.
pub async fn get_totals(
    State(state): State<Arc<AppState>>,
    client: ClientToken,
) -> Result<Json<EventTotals>, ApiError> {
    state.admit(&client)?;
    Ok(Json(state.leaderboard.get_event_totals().await?))
}

// ---------------------------------------------------------------------------
// Identity lookups (not rate limited)
// ---------------------------------------------------------------------------

/// One identity's record, named by `?username=`.
pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserStatsQuery>,
) -> Result<Json<ScoreRecord>, ApiError> {
    let raw = params.username.unwrap_or_default();
    Ok(Json(state.identities.lookup(&raw).await?))
}

/// One identity's record, named in the path.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ScoreRecord>, ApiError> {
    Ok(Json(state.identities.lookup(&username).await?))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// `{ "status": "ok" }` when the store answers.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.leaderboard.ping().await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
