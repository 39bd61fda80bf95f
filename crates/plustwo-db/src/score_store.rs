//! Read-only queries against the `plus_two_counts` table.
//!
//! The table is written by the chat bot; this store only implements the
//! read contract the leaderboard needs: windowed counts, windowed ranked
//! pages, store-wide sums, and point lookups. Every public method holds a
//! single pooled connection for its whole duration, so one API request
//! never occupies more than one pool slot. A multi-window overview runs
//! inside one `REPEATABLE READ, READ ONLY` transaction and therefore sees
//! one snapshot. Each method runs under the pool's query deadline so a
//! stalled database surfaces as [`DbError::Timeout`].

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use plustwo_types::{
    EventTotals, Identity, LeaderboardEntry, PageRequest, ScoreRecord, TugOfWarTotals, Window,
};
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::store::{OverviewSlices, WindowSlice};

/// Operations on the `plus_two_counts` table.
#[derive(Clone)]
pub struct PgScoreStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgScoreStore {
    /// Create a store bound to a connection pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
            query_timeout: pool.query_timeout(),
        }
    }

    /// Count records whose `last_updated` falls inside `window`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Timeout`] if it exceeds the deadline.
    pub async fn count_in_window(
        &self,
        window: Window,
        now: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        self.timed("count_in_window", async {
            let mut conn = self.pool.acquire().await?;
            count_rows(&mut conn, window, now).await
        })
        .await
    }

    /// Select one page of `window`, ranked by `count` descending.
    ///
    /// Ties are broken by username so consecutive pages never repeat or
    /// skip a row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Timeout`] if it exceeds the deadline.
    pub async fn select_in_window(
        &self,
        window: Window,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<LeaderboardEntry>, DbError> {
        self.timed("select_in_window", async {
            let mut conn = self.pool.acquire().await?;
            select_rows(&mut conn, window, now, page).await
        })
        .await
    }

    /// One page of `window` and its row count, read on one connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if either query fails, or
    /// [`DbError::Timeout`] if both together exceed the deadline.
    pub async fn window_slice(
        &self,
        window: Window,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<WindowSlice, DbError> {
        self.timed("window_slice", async {
            let mut conn = self.pool.acquire().await?;
            slice_rows(&mut conn, window, now, page).await
        })
        .await
    }

    /// The same page of every window plus the tug-of-war sums, read from
    /// one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any query fails, or
    /// [`DbError::Timeout`] if the transaction exceeds the deadline.
    pub async fn overview(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<OverviewSlices, DbError> {
        self.timed("overview", async {
            let mut tx = self.pool.begin().await?;
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
                .execute(&mut *tx)
                .await?;

            let all_time = slice_rows(&mut tx, Window::AllTime, now, page).await?;
            let yearly = slice_rows(&mut tx, Window::Yearly, now, page).await?;
            let monthly = slice_rows(&mut tx, Window::Monthly, now, page).await?;
            let tug_of_war = tug_rows(&mut tx).await?;
            tx.commit().await?;

            Ok(OverviewSlices {
                all_time,
                yearly,
                monthly,
                tug_of_war,
            })
        })
        .await
    }

    /// Sum positive and negative net counts across the whole table.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Timeout`] if it exceeds the deadline.
    pub async fn tug_of_war(&self) -> Result<TugOfWarTotals, DbError> {
        self.timed("tug_of_war", async {
            let mut conn = self.pool.acquire().await?;
            tug_rows(&mut conn).await
        })
        .await
    }

    /// Sum raw event tallies across the whole table.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Timeout`] if it exceeds the deadline.
    pub async fn event_totals(&self) -> Result<EventTotals, DbError> {
        let (positive, negative, tracked): (i64, i64, i64) = self
            .timed(
                "event_totals",
                sqlx::query_as::<_, (i64, i64, i64)>(
                    r"SELECT
                        COALESCE(SUM(positive_count), 0)::BIGINT,
                        COALESCE(SUM(negative_count), 0)::BIGINT,
                        COUNT(*)
                      FROM plus_two_counts",
                )
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(EventTotals {
            total_positive_events: positive,
            total_negative_events: negative,
            tracked_identities: u64::try_from(tracked).unwrap_or(0),
        })
    }

    /// Fetch one record by its normalized identity.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Timeout`] if it exceeds the deadline.
    pub async fn get_one(&self, identity: &Identity) -> Result<Option<ScoreRecord>, DbError> {
        let row: Option<ScoreRow> = self
            .timed(
                "get_one",
                sqlx::query_as::<_, ScoreRow>(
                    r"SELECT username, count, positive_count, negative_count, last_updated
                      FROM plus_two_counts
                      WHERE username = $1",
                )
                .bind(identity.as_str())
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(ScoreRecord::from))
    }

    /// Round-trip a trivial query to prove the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot answer in time.
    pub async fn ping(&self) -> Result<(), DbError> {
        let _: i32 = self
            .timed("ping", sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool))
            .await?;
        Ok(())
    }

    /// Run a query future under the configured deadline.
    async fn timed<T, F>(&self, operation: &'static str, query: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => Ok(result?),
            Err(elapsed) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.query_timeout.as_millis(),
                    "Store query timed out"
                );
                Err(DbError::Timeout(format!("{operation}: {elapsed}")))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Queries on a borrowed connection
// ---------------------------------------------------------------------------

async fn count_rows(
    conn: &mut PgConnection,
    window: Window,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let total: i64 = sqlx::query_scalar::<_, i64>(
        r"SELECT COUNT(*)
          FROM plus_two_counts
          WHERE ($1::TIMESTAMPTZ IS NULL OR last_updated >= $1)",
    )
    .bind(window.cutoff(now))
    .fetch_one(&mut *conn)
    .await?;

    Ok(u64::try_from(total).unwrap_or(0))
}

async fn select_rows(
    conn: &mut PgConnection,
    window: Window,
    now: DateTime<Utc>,
    page: PageRequest,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let limit = i64::from(page.page_size());
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    let rows: Vec<EntryRow> = sqlx::query_as::<_, EntryRow>(
        r"SELECT username, count
          FROM plus_two_counts
          WHERE ($1::TIMESTAMPTZ IS NULL OR last_updated >= $1)
          ORDER BY count DESC, username ASC
          LIMIT $2 OFFSET $3",
    )
    .bind(window.cutoff(now))
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut *conn)
    .await?;

    tracing::debug!(
        window = %window,
        page = page.page(),
        rows = rows.len(),
        "Selected leaderboard page"
    );

    Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
}

async fn slice_rows(
    conn: &mut PgConnection,
    window: Window,
    now: DateTime<Utc>,
    page: PageRequest,
) -> Result<WindowSlice, sqlx::Error> {
    let entries = select_rows(conn, window, now, page).await?;
    let total_count = count_rows(conn, window, now).await?;
    Ok(WindowSlice {
        entries,
        total_count,
    })
}

async fn tug_rows(conn: &mut PgConnection) -> Result<TugOfWarTotals, sqlx::Error> {
    let (positive, negative): (i64, i64) = sqlx::query_as::<_, (i64, i64)>(
        r"SELECT
            COALESCE(SUM(count) FILTER (WHERE count > 0), 0)::BIGINT,
            COALESCE(SUM(-count) FILTER (WHERE count < 0), 0)::BIGINT
          FROM plus_two_counts",
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(TugOfWarTotals { positive, negative })
}

/// A `(username, count)` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntryRow {
    /// Normalized username.
    pub username: String,
    /// Net score.
    pub count: i64,
}

impl From<EntryRow> for LeaderboardEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            identity: Identity::from_normalized(row.username),
            count: row.count,
        }
    }
}

/// A full row from the `plus_two_counts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRow {
    /// Normalized username.
    pub username: String,
    /// Net score.
    pub count: i64,
    /// Cumulative positive events.
    pub positive_count: i64,
    /// Cumulative negative events.
    pub negative_count: i64,
    /// Time of the most recent event.
    pub last_updated: DateTime<Utc>,
}

impl From<ScoreRow> for ScoreRecord {
    fn from(row: ScoreRow) -> Self {
        Self {
            identity: Identity::from_normalized(row.username),
            count: row.count,
            positive_count: row.positive_count,
            negative_count: row.negative_count,
            last_updated: row.last_updated,
        }
    }
}
