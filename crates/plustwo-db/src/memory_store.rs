//! In-memory score store.
//!
//! Holds records in insertion order behind a [`RwLock`]. Ranking uses a
//! stable sort, so ties keep insertion order. Multi-part reads take the
//! read lock once, so they see one consistent state. Used by tests and
//! local demos where no database is available.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use plustwo_types::{
    EventTotals, Identity, LeaderboardEntry, PageRequest, ScoreRecord, TugOfWarTotals, Window,
};
use tokio::sync::RwLock;

use crate::store::{OverviewSlices, WindowSlice};

/// A score store backed by a shared vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    records: Arc<RwLock<Vec<ScoreRecord>>>,
}

impl MemoryScoreStore {
    /// Create a store seeded with `records`, in the given order.
    pub fn with_records(records: impl IntoIterator<Item = ScoreRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records.into_iter().collect())),
        }
    }

    /// Insert a record, replacing any record with the same identity in place.
    pub async fn upsert(&self, record: ScoreRecord) {
        let mut records = self.records.write().await;
        if let Some(existing) = records.iter_mut().find(|r| r.identity == record.identity) {
            *existing = record;
        } else {
            records.push(record);
        }
    }

    /// Count records inside `window`.
    pub async fn count_in_window(&self, window: Window, now: DateTime<Utc>) -> u64 {
        count_matching(&self.records.read().await, window, now)
    }

    /// Select one ranked page of `window`.
    pub async fn select_in_window(
        &self,
        window: Window,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Vec<LeaderboardEntry> {
        rank_page(&self.records.read().await, window, now, page)
    }

    /// One page of `window` and its row count under a single read lock.
    pub async fn window_slice(
        &self,
        window: Window,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> WindowSlice {
        slice(&self.records.read().await, window, now, page)
    }

    /// Every window's page and the tug-of-war sums under a single read lock.
    pub async fn overview(&self, now: DateTime<Utc>, page: PageRequest) -> OverviewSlices {
        let records = self.records.read().await;
        OverviewSlices {
            all_time: slice(&records, Window::AllTime, now, page),
            yearly: slice(&records, Window::Yearly, now, page),
            monthly: slice(&records, Window::Monthly, now, page),
            tug_of_war: records.iter().map(|r| r.count).collect(),
        }
    }

    /// Positive and negative net totals over every record.
    pub async fn tug_of_war(&self) -> TugOfWarTotals {
        self.records.read().await.iter().map(|r| r.count).collect()
    }

    /// Raw event tallies over every record.
    pub async fn event_totals(&self) -> EventTotals {
        let records = self.records.read().await;
        records.iter().fold(
            EventTotals {
                tracked_identities: u64::try_from(records.len()).unwrap_or(u64::MAX),
                ..EventTotals::default()
            },
            |mut totals, r| {
                totals.total_positive_events =
                    totals.total_positive_events.saturating_add(r.positive_count);
                totals.total_negative_events =
                    totals.total_negative_events.saturating_add(r.negative_count);
                totals
            },
        )
    }

    /// Look up one record by identity.
    pub async fn get_one(&self, identity: &Identity) -> Option<ScoreRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| &r.identity == identity)
            .cloned()
    }
}

fn count_matching(records: &[ScoreRecord], window: Window, now: DateTime<Utc>) -> u64 {
    let count = records
        .iter()
        .filter(|r| window.contains(r.last_updated, now))
        .count();
    u64::try_from(count).unwrap_or(u64::MAX)
}

fn rank_page(
    records: &[ScoreRecord],
    window: Window,
    now: DateTime<Utc>,
    page: PageRequest,
) -> Vec<LeaderboardEntry> {
    let mut eligible: Vec<LeaderboardEntry> = records
        .iter()
        .filter(|r| window.contains(r.last_updated, now))
        .map(ScoreRecord::to_entry)
        .collect();

    eligible.sort_by(|a, b| b.count.cmp(&a.count));

    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.page_size()).unwrap_or(usize::MAX);
    eligible.into_iter().skip(skip).take(take).collect()
}

fn slice(
    records: &[ScoreRecord],
    window: Window,
    now: DateTime<Utc>,
    page: PageRequest,
) -> WindowSlice {
    WindowSlice {
        entries: rank_page(records, window, now, page),
        total_count: count_matching(records, window, now),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(name: &str, pos: i64, neg: i64, age_days: i64) -> ScoreRecord {
        ScoreRecord::from_tallies(
            Identity::from_normalized(name.to_owned()),
            pos,
            neg,
            Utc::now() - Duration::days(age_days),
        )
    }

    fn sample() -> MemoryScoreStore {
        MemoryScoreStore::with_records([
            record("alice", 10, 0, 2),
            record("bob", 0, 3, 100),
            record("carol", 0, 0, 800),
        ])
    }

    #[tokio::test]
    async fn ranks_by_count_descending() {
        let store = sample();
        let rows = store
            .select_in_window(Window::AllTime, Utc::now(), PageRequest::first(10))
            .await;
        let names: Vec<&str> = rows.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(names, ["alice", "carol", "bob"]);
    }

    #[tokio::test]
    async fn windows_filter_by_last_updated() {
        let store = sample();
        let now = Utc::now();
        assert_eq!(store.count_in_window(Window::AllTime, now).await, 3);
        assert_eq!(store.count_in_window(Window::Yearly, now).await, 2);
        assert_eq!(store.count_in_window(Window::Monthly, now).await, 1);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let store = MemoryScoreStore::with_records([
            record("zed", 1, 0, 1),
            record("amy", 1, 0, 1),
            record("max", 1, 0, 1),
        ]);
        let rows = store
            .select_in_window(Window::AllTime, Utc::now(), PageRequest::first(3))
            .await;
        let names: Vec<&str> = rows.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(names, ["zed", "amy", "max"]);
    }

    #[tokio::test]
    async fn page_past_end_is_empty() {
        let store = sample();
        let page = PageRequest::new(5, 2).unwrap_or_default();
        let rows = store.select_in_window(Window::AllTime, Utc::now(), page).await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_in_place() {
        let store = sample();
        store.upsert(record("bob", 5, 3, 0)).await;
        store.upsert(record("dave", 1, 0, 0)).await;
        assert_eq!(store.event_totals().await.tracked_identities, 4);
        let bob = store
            .get_one(&Identity::from_normalized(String::from("bob")))
            .await;
        assert_eq!(bob.map(|r| r.count), Some(2));
    }

    #[tokio::test]
    async fn totals_cover_every_record() {
        let store = sample();
        assert_eq!(
            store.tug_of_war().await,
            TugOfWarTotals { positive: 10, negative: 3 }
        );
        let events = store.event_totals().await;
        assert_eq!(events.total_positive_events, 10);
        assert_eq!(events.total_negative_events, 3);
        assert_eq!(events.tracked_identities, 3);
    }

    #[tokio::test]
    async fn window_slice_pairs_page_with_count() {
        let store = sample();
        let slice = store
            .window_slice(Window::Yearly, Utc::now(), PageRequest::first(1))
            .await;
        assert_eq!(slice.total_count, 2);
        assert_eq!(slice.entries.len(), 1);
        assert_eq!(slice.entries.first().map(|e| e.count), Some(10));
    }

    #[tokio::test]
    async fn overview_reads_every_window_together() {
        let store = sample();
        let overview = store.overview(Utc::now(), PageRequest::first(10)).await;
        assert_eq!(overview.all_time.total_count, 3);
        assert_eq!(overview.yearly.total_count, 2);
        assert_eq!(overview.monthly.total_count, 1);
        assert!(overview
            .monthly
            .entries
            .iter()
            .all(|e| overview.yearly.entries.contains(e)));
        assert_eq!(
            overview.tug_of_war,
            TugOfWarTotals { positive: 10, negative: 3 }
        );
    }
}
