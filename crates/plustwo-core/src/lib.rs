//! Query services for the plus-two leaderboard.
//!
//! This crate sits between the HTTP boundary and the score store:
//!
//! ```text
//! API boundary --> RateLimiter --> LeaderboardService --> ScoreStore
//!              \-------------> IdentityService -------/
//! ```
//!
//! # Modules
//!
//! - [`rate_limit`] -- Per-client fixed-window [`RateLimiter`]
//! - [`leaderboard`] -- Ranked, windowed pages and tug-of-war totals
//! - [`lookup`] -- Single-identity lookups
//! - [`error`] -- [`QueryError`] taxonomy and stable categories
//! - [`config`] -- YAML service configuration

pub mod config;
pub mod error;
pub mod leaderboard;
pub mod lookup;
pub mod rate_limit;

// Re-export primary types for convenience.
pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorCategory, QueryError};
pub use leaderboard::LeaderboardService;
pub use lookup::IdentityService;
pub use rate_limit::{RateLimitExceeded, RateLimitPolicy, RateLimiter};
