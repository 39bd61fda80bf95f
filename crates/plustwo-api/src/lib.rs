//! HTTP API for the plus-two leaderboard.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Leaderboard endpoints** for ranked, paginated, time-windowed
//!   views and the store-wide tug-of-war balance, guarded by a
//!   per-client rate limit
//! - **Identity endpoints** for single-participant lookups
//! - **Health endpoint** for liveness checks
//!
//! Handlers validate untyped input, call into
//! [`plustwo_core`] services, and map failures through
//! [`ApiError`](error::ApiError) so every error body has a stable
//! category and internal detail never reaches the caller.

pub mod client;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use client::ClientToken;
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
