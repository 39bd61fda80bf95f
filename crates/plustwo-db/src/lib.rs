//! Data layer for the plus-two leaderboard service.
//!
//! The `plus_two_counts` table is owned by the chat bot that records
//! +2/-2 events. This crate only reads it: windowed counts, ranked pages,
//! store-wide sums, and point lookups.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`score_store`] -- Read queries against `plus_two_counts`
//! - [`memory_store`] -- In-memory backend for tests and demos
//! - [`store`] -- [`ScoreStore`] enum dispatch over both backends
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory_store;
pub mod postgres;
pub mod score_store;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use memory_store::MemoryScoreStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use score_store::{EntryRow, PgScoreStore, ScoreRow};
pub use store::{OverviewSlices, ScoreStore, WindowSlice};
