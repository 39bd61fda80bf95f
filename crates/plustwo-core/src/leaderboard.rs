//! Ranked, paginated, time-windowed leaderboard queries.
//!
//! [`LeaderboardService`] turns the store's per-identity totals into
//! ranked pages for one window or all three, plus the store-wide
//! tug-of-war balance.
//!
//! # Consistency
//!
//! A multi-window request reads the clock once and computes every window
//! cutoff from that instant. Each request holds one store handle: a
//! single page reads its rows and count on one connection, and the
//! overview reads all three windows inside one read-only snapshot.

use chrono::{DateTime, Utc};
use plustwo_db::{OverviewSlices, ScoreStore, WindowSlice};
use plustwo_types::{
    EventTotals, LeaderboardOverview, LeaderboardPage, PageRequest, TugOfWarTotals, Window,
    WindowCounts,
};

use crate::error::QueryError;

/// Query service over a [`ScoreStore`].
#[derive(Clone)]
pub struct LeaderboardService {
    store: ScoreStore,
}

impl LeaderboardService {
    /// Create a service reading from `store`.
    pub const fn new(store: ScoreStore) -> Self {
        Self { store }
    }

    /// One page of `window`, with the window's total row count.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if the store fails.
    pub async fn get_page(
        &self,
        window: Window,
        page: PageRequest,
    ) -> Result<LeaderboardPage, QueryError> {
        self.get_page_at(window, page, Utc::now()).await
    }

    /// [`get_page`](Self::get_page) with window cutoffs computed from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if the store fails.
    pub async fn get_page_at(
        &self,
        window: Window,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardPage, QueryError> {
        let WindowSlice {
            entries,
            total_count,
        } = self.store.window_slice(window, now, page).await?;

        tracing::debug!(
            window = %window,
            page = page.page(),
            page_size = page.page_size(),
            rows = entries.len(),
            total_count,
            "Leaderboard page served"
        );

        Ok(LeaderboardPage {
            window,
            entries,
            total_count,
            current_page: page.page(),
            page_size: page.page_size(),
        })
    }

    /// Store-wide positive and negative net totals, ignoring windows.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if the store fails.
    pub async fn get_tug_of_war(&self) -> Result<TugOfWarTotals, QueryError> {
        Ok(self.store.tug_of_war().await?)
    }

    /// The same page of every window, the tug-of-war totals, and the
    /// per-window row counts.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if any store read fails.
    pub async fn get_overview(&self, page: PageRequest) -> Result<LeaderboardOverview, QueryError> {
        self.get_overview_at(page, Utc::now()).await
    }

    /// [`get_overview`](Self::get_overview) with cutoffs computed from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if any store read fails.
    pub async fn get_overview_at(
        &self,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardOverview, QueryError> {
        let OverviewSlices {
            all_time,
            yearly,
            monthly,
            tug_of_war,
        } = self.store.overview(now, page).await?;

        tracing::debug!(
            page = page.page(),
            page_size = page.page_size(),
            all_time = all_time.total_count,
            yearly = yearly.total_count,
            monthly = monthly.total_count,
            "Leaderboard overview served"
        );

        Ok(LeaderboardOverview {
            total_counts: WindowCounts {
                all_time: all_time.total_count,
                yearly: yearly.total_count,
                monthly: monthly.total_count,
            },
            all_time: all_time.entries,
            yearly: yearly.entries,
            monthly: monthly.entries,
            tug_of_war,
            current_page: page.page(),
            page_size: page.page_size(),
        })
    }

    /// The top `limit` identities of all time.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if the store fails.
    pub async fn get_top(&self, limit: u32) -> Result<LeaderboardPage, QueryError> {
        self.get_page(Window::AllTime, PageRequest::first(limit)).await
    }

    /// Store-wide raw event tallies.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if the store fails.
    pub async fn get_event_totals(&self) -> Result<EventTotals, QueryError> {
        Ok(self.store.event_totals().await?)
    }

    /// Check that the store answers.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreUnavailable`] or [`QueryError::Store`]
    /// if it does not.
    pub async fn ping(&self) -> Result<(), QueryError> {
        Ok(self.store.ping().await?)
    }
}
