//! Pagination requests and the leaderboard views built from them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::score::{LeaderboardEntry, TugOfWarTotals};
use crate::window::Window;

/// Page used when the caller does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// PageRequest
// ---------------------------------------------------------------------------

/// A 1-indexed page of `page_size` rows.
///
/// Both fields are at least 1; the constructor refuses anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a page request. Returns `None` if either value is zero.
    pub const fn new(page: u32, page_size: u32) -> Option<Self> {
        if page == 0 || page_size == 0 {
            return None;
        }
        Some(Self { page, page_size })
    }

    /// The first page holding `limit` rows (at least one).
    pub const fn first(limit: u32) -> Self {
        Self {
            page: 1,
            page_size: if limit == 0 { 1 } else { limit },
        }
    }

    /// The 1-indexed page number.
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Rows per page.
    pub const fn page_size(self) -> u32 {
        self.page_size
    }

    /// Rows to skip: `(page - 1) * page_size`.
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)).saturating_mul(u64::from(self.page_size))
    }

    /// Number of pages needed to show `total` rows.
    pub fn page_count(self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One window's ranked page plus the window's total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardPage {
    /// Which window the rows were drawn from.
    pub window: Window,
    /// Rows ordered by `count` descending. May be empty.
    pub entries: Vec<LeaderboardEntry>,
    /// Rows eligible for the window across all pages.
    #[ts(type = "number")]
    pub total_count: u64,
    /// The page that was served.
    pub current_page: u32,
    /// Rows per page.
    pub page_size: u32,
}

/// Per-window row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WindowCounts {
    /// Rows in `all_time`.
    #[ts(type = "number")]
    pub all_time: u64,
    /// Rows in `yearly`.
    #[ts(type = "number")]
    pub yearly: u64,
    /// Rows in `monthly`.
    #[ts(type = "number")]
    pub monthly: u64,
}

/// The combined leaderboard payload: the same page of every window, the
/// tug-of-war balance, and per-window totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardOverview {
    /// Page of the `all_time` window.
    pub all_time: Vec<LeaderboardEntry>,
    /// Page of the `yearly` window.
    pub yearly: Vec<LeaderboardEntry>,
    /// Page of the `monthly` window.
    pub monthly: Vec<LeaderboardEntry>,
    /// Store-wide balance, unfiltered by window.
    #[serde(rename = "tugOfWar")]
    pub tug_of_war: TugOfWarTotals,
    /// Rows eligible per window.
    #[serde(rename = "totalCounts")]
    pub total_counts: WindowCounts,
    /// The page that was served.
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    /// Rows per page.
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}
