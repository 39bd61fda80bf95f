//! Integration tests for the leaderboard API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` against
//! the in-memory store, without starting a TCP server.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use plustwo_api::router::build_router;
use plustwo_api::state::AppState;
use plustwo_core::ServiceConfig;
use plustwo_db::MemoryScoreStore;
use plustwo_types::{Identity, ScoreRecord};
use serde_json::{json, Value};
use tower::ServiceExt;

fn record(name: &str, positive: i64, negative: i64, days_ago: i64) -> ScoreRecord {
    ScoreRecord::from_tallies(
        Identity::from_normalized(name.to_owned()),
        positive,
        negative,
        Utc::now() - Duration::days(days_ago),
    )
}

fn scenario() -> Vec<ScoreRecord> {
    vec![
        record("alice", 12, 2, 0),
        record("bob", 1, 4, 0),
        record("carol", 3, 3, 0),
    ]
}

fn build(records: Vec<ScoreRecord>, requests_per_interval: u32, trust_forwarded: bool) -> Router {
    let mut config = ServiceConfig::default();
    config.rate_limit.requests_per_interval = requests_per_interval;
    config.server.trust_forwarded_headers = trust_forwarded;
    let store = MemoryScoreStore::with_records(records);
    let state = Arc::new(AppState::new(store.into(), &config));
    build_router(state, &[])
}

/// Direct-facing router: clients are told apart by peer address only.
fn router_with(records: Vec<ScoreRecord>, requests_per_interval: u32) -> Router {
    build(records, requests_per_interval, false)
}

/// Router behind a trusted proxy: `x-forwarded-for` names the client.
fn proxied_router(records: Vec<ScoreRecord>, requests_per_interval: u32) -> Router {
    build(records, requests_per_interval, true)
}

fn router(records: Vec<ScoreRecord>) -> Router {
    router_with(records, 20)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn get_from(uri: &str, client: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

fn get_from_peer(uri: &str, peer: &str, forwarded_for: &str) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    Request::get(uri)
        .header("x-forwarded-for", forwarded_for)
        .extension(ConnectInfo(peer))
        .body(Body::empty())
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Leaderboard
// =========================================================================

#[tokio::test]
async fn test_leaderboard_scenario() {
    let response = router(scenario())
        .oneshot(get("/api/leaderboard?page=1&pageSize=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json["all_time"],
        json!([
            { "username": "alice", "count": 10 },
            { "username": "carol", "count": 0 },
        ])
    );
    assert_eq!(json["tugOfWar"], json!({ "positive": 10, "negative": 3 }));
    assert_eq!(
        json["totalCounts"],
        json!({ "all_time": 3, "yearly": 3, "monthly": 3 })
    );
    assert_eq!(json["currentPage"], 1);
    assert_eq!(json["pageSize"], 2);
}

#[tokio::test]
async fn test_leaderboard_empty_store_defaults() {
    let response = router(Vec::new())
        .oneshot(get("/api/leaderboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["all_time"], json!([]));
    assert_eq!(json["yearly"], json!([]));
    assert_eq!(json["monthly"], json!([]));
    assert_eq!(json["tugOfWar"], json!({ "positive": 0, "negative": 0 }));
    assert_eq!(
        json["totalCounts"],
        json!({ "all_time": 0, "yearly": 0, "monthly": 0 })
    );
    assert_eq!(json["currentPage"], 1);
    assert_eq!(json["pageSize"], 20);
}

#[tokio::test]
async fn test_leaderboard_bad_pagination_falls_back() {
    let response = router(scenario())
        .oneshot(get("/api/leaderboard?page=abc&pageSize=-5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["currentPage"], 1);
    assert_eq!(json["pageSize"], 20);
    assert_eq!(json["all_time"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_leaderboard_page_size_clamped() {
    let response = router(scenario())
        .oneshot(get("/api/leaderboard?pageSize=5000"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["pageSize"], 100);
}

#[tokio::test]
async fn test_leaderboard_page_past_end() {
    let response = router(scenario())
        .oneshot(get("/api/leaderboard?page=7&pageSize=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["all_time"], json!([]));
    assert_eq!(json["totalCounts"]["all_time"], 3);
    assert_eq!(json["currentPage"], 7);
}

#[tokio::test]
async fn test_leaderboard_windows_filter_by_recency() {
    let records = vec![
        record("fresh", 5, 0, 2),
        record("spring", 8, 0, 200),
        record("ancient", 30, 0, 900),
    ];
    let response = router(records)
        .oneshot(get("/api/leaderboard"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;

    assert_eq!(
        json["totalCounts"],
        json!({ "all_time": 3, "yearly": 2, "monthly": 1 })
    );
    assert_eq!(json["monthly"], json!([{ "username": "fresh", "count": 5 }]));
    assert_eq!(json["all_time"][0]["username"], "ancient");
    assert_eq!(json["tugOfWar"]["positive"], 43);
}

#[tokio::test]
async fn test_window_leaderboard() {
    let response = router(scenario())
        .oneshot(get("/api/leaderboard/monthly?pageSize=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["window"], "monthly");
    assert_eq!(json["entries"], json!([{ "username": "alice", "count": 10 }]));
    assert_eq!(json["totalCount"], 3);
    assert_eq!(json["pageSize"], 1);
}

#[tokio::test]
async fn test_window_leaderboard_unknown_window() {
    let response = router(scenario())
        .oneshot(get("/api/leaderboard/weekly"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["category"], "bad_request");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_top_and_totals() {
    let app = router(scenario());

    let response = app.clone().oneshot(get("/api/top?limit=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["entries"], json!([{ "username": "alice", "count": 10 }]));

    let response = app.oneshot(get("/api/totals")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json,
        json!({
            "totalPositiveEvents": 16,
            "totalNegativeEvents": 9,
            "trackedIdentities": 3,
        })
    );
}

// =========================================================================
// Rate limiting
// =========================================================================

#[tokio::test]
async fn test_rate_limit_rejects_after_budget() {
    let app = proxied_router(scenario(), 2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get_from("/api/leaderboard", "203.0.113.5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get_from("/api/leaderboard", "203.0.113.5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Rate limit exceeded");
    assert_eq!(json["category"], "rate_limited");

    // Another client still has its own budget.
    let response = app
        .oneshot(get_from("/api/leaderboard", "198.51.100.9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_shared_across_leaderboard_endpoints() {
    let app = proxied_router(scenario(), 1);

    let response = app
        .clone()
        .oneshot(get_from("/api/totals", "203.0.113.5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_from("/api/leaderboard/yearly", "203.0.113.5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_identity_and_health_not_rate_limited() {
    let app = proxied_router(scenario(), 1);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get_from("/api/user-stats?username=alice", "203.0.113.5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_from("/api/health", "203.0.113.5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_forwarded_for_ignored_unless_trusted() {
    let app = router_with(scenario(), 2);

    // Rotating the header does not mint fresh budgets.
    let mut statuses = Vec::new();
    for i in 0..5 {
        let response = app
            .clone()
            .oneshot(get_from("/api/leaderboard", &format!("203.0.113.{i}")))
            .await
            .unwrap();
        statuses.push(response.status());
    }
    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
}

#[tokio::test]
async fn test_peer_address_identifies_client_unless_trusted() {
    let app = router_with(scenario(), 1);

    let response = app
        .clone()
        .oneshot(get_from_peer("/api/totals", "192.0.2.1:40000", "203.0.113.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Same peer on a new port with a different forwarded address.
    let response = app
        .clone()
        .oneshot(get_from_peer("/api/totals", "192.0.2.1:40001", "203.0.113.2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app
        .oneshot(get_from_peer("/api/totals", "192.0.2.2:40000", "203.0.113.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_window_does_not_consume_budget() {
    let app = router_with(scenario(), 1);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(get("/api/leaderboard/weekly"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .oneshot(get("/api/leaderboard/monthly"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =========================================================================
// Identity lookups
// =========================================================================

#[tokio::test]
async fn test_user_stats_case_insensitive() {
    let app = router(scenario());

    let response = app
        .clone()
        .oneshot(get("/api/user-stats?username=Alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["username"], "alice");
    assert_eq!(json["count"], 10);
    assert_eq!(json["positiveCount"], 12);
    assert_eq!(json["negativeCount"], 2);
    assert!(json["lastUpdated"].is_string());

    let response = app.oneshot(get("/api/user/ALICE")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["count"], 10);
}

#[tokio::test]
async fn test_user_stats_missing_or_blank_username() {
    let app = router(scenario());

    for uri in ["/api/user-stats", "/api/user-stats?username=", "/api/user-stats?username=%20%20"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["category"], "bad_request");
    }
}

#[tokio::test]
async fn test_user_stats_unknown_identity() {
    let response = router(scenario())
        .oneshot(get("/api/user-stats?username=nobody"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["category"], "not_found");
    assert_eq!(json["status"], 404);
}

// =========================================================================
// Health
// =========================================================================

#[tokio::test]
async fn test_health() {
    let response = router(Vec::new())
        .oneshot(get("/api/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({ "status": "ok" })
    );
}
