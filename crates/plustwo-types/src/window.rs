//! Named leaderboard time windows.
//!
//! A window filters records on `last_updated`. Cutoffs are computed from
//! the instant the query runs, so a record drifts out of `monthly` and
//! `yearly` as wall-clock time passes even without new events.

use core::str::FromStr;

use chrono::{DateTime, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A named time filter applied to `last_updated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Window {
    /// Every record, no time filter.
    AllTime,
    /// Records updated within the last year.
    Yearly,
    /// Records updated within the last month.
    Monthly,
}

impl Window {
    /// Every window, widest first.
    pub const ALL: [Self; 3] = [Self::AllTime, Self::Yearly, Self::Monthly];

    /// The wire name of the window.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllTime => "all_time",
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
        }
    }

    /// Earliest `last_updated` admitted by this window, relative to `now`.
    ///
    /// The cutoff is midnight UTC on the same calendar day one month (or
    /// one year) before `now`. `AllTime` has no cutoff.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = match self {
            Self::AllTime => return None,
            Self::Yearly => Months::new(12),
            Self::Monthly => Months::new(1),
        };
        let cutoff = now
            .date_naive()
            .checked_sub_months(months)
            .map_or(DateTime::<Utc>::MIN_UTC, |day| {
                day.and_time(NaiveTime::MIN).and_utc()
            });
        Some(cutoff)
    }

    /// Whether a record last updated at `last_updated` falls inside the
    /// window as seen from `now`.
    pub fn contains(self, last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.cutoff(now).is_none_or(|cutoff| last_updated >= cutoff)
    }
}

impl core::fmt::Display for Window {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a window name is not one of the known windows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown window `{0}` (expected all_time, yearly or monthly)")]
pub struct ParseWindowError(pub String);

impl FromStr for Window {
    type Err = ParseWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_time" => Ok(Self::AllTime),
            "yearly" => Ok(Self::Yearly),
            "monthly" => Ok(Self::Monthly),
            other => Err(ParseWindowError(other.to_owned())),
        }
    }
}
