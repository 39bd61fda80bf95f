//! Backend-agnostic score store.
//!
//! [`ScoreStore`] dispatches the read contract to either `PostgreSQL` or
//! the in-memory backend. Enum dispatch keeps the async methods usable
//! without boxing futures behind a trait object.

use chrono::{DateTime, Utc};
use plustwo_types::{
    EventTotals, Identity, LeaderboardEntry, PageRequest, ScoreRecord, TugOfWarTotals, Window,
};

use crate::error::DbError;
use crate::memory_store::MemoryScoreStore;
use crate::postgres::PostgresPool;
use crate::score_store::PgScoreStore;

/// One ranked page of a window and the window's row count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSlice {
    /// Ranked entries on the requested page.
    pub entries: Vec<LeaderboardEntry>,
    /// Rows in the window across all pages.
    pub total_count: u64,
}

/// The same page of every window plus the tug-of-war sums, read together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewSlices {
    /// Page of the unfiltered ranking.
    pub all_time: WindowSlice,
    /// Page of the last year.
    pub yearly: WindowSlice,
    /// Page of the last month.
    pub monthly: WindowSlice,
    /// Store-wide net sums.
    pub tug_of_war: TugOfWarTotals,
}

/// The score store the services read from.
#[derive(Clone)]
pub enum ScoreStore {
    /// `PostgreSQL` `plus_two_counts` table.
    Postgres(PgScoreStore),
    /// In-memory records.
    Memory(MemoryScoreStore),
}

impl ScoreStore {
    /// A store reading from a connected `PostgreSQL` pool.
    pub fn postgres(pool: &PostgresPool) -> Self {
        Self::Postgres(PgScoreStore::new(pool))
    }

    /// Human-readable backend name for logging.
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// `countRecordsWhere(window)`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails or times out.
    pub async fn count_in_window(
        &self,
        window: Window,
        now: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        match self {
            Self::Postgres(store) => store.count_in_window(window, now).await,
            Self::Memory(store) => Ok(store.count_in_window(window, now).await),
        }
    }

    /// `selectRecordsWhere(window, count desc, limit, offset)`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails or times out.
    pub async fn select_in_window(
        &self,
        window: Window,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<LeaderboardEntry>, DbError> {
        match self {
            Self::Postgres(store) => store.select_in_window(window, now, page).await,
            Self::Memory(store) => Ok(store.select_in_window(window, now, page).await),
        }
    }

    /// A page of `window` and its row count, using one store handle.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails or times out.
    pub async fn window_slice(
        &self,
        window: Window,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<WindowSlice, DbError> {
        match self {
            Self::Postgres(store) => store.window_slice(window, now, page).await,
            Self::Memory(store) => Ok(store.window_slice(window, now, page).await),
        }
    }

    /// Every window's page and the tug-of-war sums from one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails or times out.
    pub async fn overview(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<OverviewSlices, DbError> {
        match self {
            Self::Postgres(store) => store.overview(now, page).await,
            Self::Memory(store) => Ok(store.overview(now, page).await),
        }
    }

    /// `sumWhere(count > 0)` and `sumAbsWhere(count < 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails or times out.
    pub async fn tug_of_war(&self) -> Result<TugOfWarTotals, DbError> {
        match self {
            Self::Postgres(store) => store.tug_of_war().await,
            Self::Memory(store) => Ok(store.tug_of_war().await),
        }
    }

    /// Store-wide event tallies.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails or times out.
    pub async fn event_totals(&self) -> Result<EventTotals, DbError> {
        match self {
            Self::Postgres(store) => store.event_totals().await,
            Self::Memory(store) => Ok(store.event_totals().await),
        }
    }

    /// `getOne(identity)`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend query fails or times out.
    pub async fn get_one(&self, identity: &Identity) -> Result<Option<ScoreRecord>, DbError> {
        match self {
            Self::Postgres(store) => store.get_one(identity).await,
            Self::Memory(store) => Ok(store.get_one(identity).await),
        }
    }

    /// Check that the backend answers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), DbError> {
        match self {
            Self::Postgres(store) => store.ping().await,
            Self::Memory(_) => Ok(()),
        }
    }
}

impl From<MemoryScoreStore> for ScoreStore {
    fn from(store: MemoryScoreStore) -> Self {
        Self::Memory(store)
    }
}

impl From<PgScoreStore> for ScoreStore {
    fn from(store: PgScoreStore) -> Self {
        Self::Postgres(store)
    }
}
