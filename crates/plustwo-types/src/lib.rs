//! Shared type definitions for the plus-two leaderboard service.
//!
//! This crate is the single source of truth for the shapes that flow
//! between the store, the query services, and the HTTP boundary. Response
//! types flow downstream to `TypeScript` via `ts-rs` for the leaderboard
//! website.
//!
//! # Modules
//!
//! - [`identity`] -- Case-normalized participant identity
//! - [`score`] -- Stored score records and derived aggregates
//! - [`window`] -- Named time windows and their cutoffs
//! - [`page`] -- Pagination requests and leaderboard views

pub mod identity;
pub mod page;
pub mod score;
pub mod window;

// Re-export all public types at crate root for convenience.
pub use identity::Identity;
pub use page::{LeaderboardOverview, LeaderboardPage, PageRequest, WindowCounts};
pub use score::{EventTotals, LeaderboardEntry, ScoreRecord, TugOfWarTotals};
pub use window::{ParseWindowError, Window};
