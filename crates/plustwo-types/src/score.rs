//! Stored score records and the aggregates derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::identity::Identity;

// ---------------------------------------------------------------------------
// ScoreRecord
// ---------------------------------------------------------------------------

/// One participant's running totals as held by the score store.
///
/// Created and mutated only by the external event writer. The service
/// reads these records and never changes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ScoreRecord {
    /// Normalized participant key.
    #[serde(rename = "username")]
    pub identity: Identity,
    /// Net score. Always `positive_count - negative_count`.
    #[ts(type = "number")]
    pub count: i64,
    /// Cumulative positive events.
    #[ts(type = "number")]
    pub positive_count: i64,
    /// Cumulative magnitude of negative events.
    #[ts(type = "number")]
    pub negative_count: i64,
    /// Time of the most recent event affecting this participant.
    pub last_updated: DateTime<Utc>,
}

impl ScoreRecord {
    /// Build a record from its event tallies, deriving the net count.
    pub const fn from_tallies(
        identity: Identity,
        positive_count: i64,
        negative_count: i64,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            count: positive_count.saturating_sub(negative_count),
            positive_count,
            negative_count,
            last_updated,
        }
    }

    /// Whether the net count agrees with the event tallies.
    pub fn is_consistent(&self) -> bool {
        self.positive_count >= 0
            && self.negative_count >= 0
            && self.positive_count.checked_sub(self.negative_count) == Some(self.count)
    }

    /// Project the record onto a leaderboard row.
    pub fn to_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            identity: self.identity.clone(),
            count: self.count,
        }
    }
}

// ---------------------------------------------------------------------------
// LeaderboardEntry
// ---------------------------------------------------------------------------

/// A single ranked row: who, and their net score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// Normalized participant key.
    #[serde(rename = "username")]
    pub identity: Identity,
    /// Net score.
    #[ts(type = "number")]
    pub count: i64,
}

impl LeaderboardEntry {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(identity: &str, count: i64) -> Self {
        Self {
            identity: Identity::from_normalized(identity.to_lowercase()),
            count,
        }
    }
}

// ---------------------------------------------------------------------------
// TugOfWarTotals
// ---------------------------------------------------------------------------

/// Store-wide balance of positive against negative net scores.
///
/// Zero-count records contribute to neither side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TugOfWarTotals {
    /// Sum of `count` over records with `count > 0`.
    #[ts(type = "number")]
    pub positive: i64,
    /// Sum of `|count|` over records with `count < 0`.
    #[ts(type = "number")]
    pub negative: i64,
}

impl TugOfWarTotals {
    /// Fold one net count into the totals.
    pub const fn add(&mut self, count: i64) {
        if count > 0 {
            self.positive = self.positive.saturating_add(count);
        } else if count < 0 {
            self.negative = self.negative.saturating_add(count.saturating_neg());
        }
    }
}

impl FromIterator<i64> for TugOfWarTotals {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut totals = Self::default();
        for count in iter {
            totals.add(count);
        }
        totals
    }
}

// ---------------------------------------------------------------------------
// EventTotals
// ---------------------------------------------------------------------------

/// Store-wide event tallies across every participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EventTotals {
    /// Sum of `positive_count` over all records.
    #[ts(type = "number")]
    pub total_positive_events: i64,
    /// Sum of `negative_count` over all records.
    #[ts(type = "number")]
    pub total_negative_events: i64,
    /// Number of records in the store.
    #[ts(type = "number")]
    pub tracked_identities: u64,
}
