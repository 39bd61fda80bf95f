//! Static leaderboard export.
//!
//! Writes the top identities of every window to a JSON file so a static
//! site can render the leaderboard without calling the API.

use std::path::Path;

use chrono::Utc;
use plustwo_core::{LeaderboardService, QueryError};
use plustwo_types::{LeaderboardEntry, PageRequest};
use serde::Serialize;
use tracing::info;

use crate::error::AppError;

/// Rows exported per window.
pub const EXPORT_LIMIT: u32 = 10;

/// The exported document: `{ all_time, yearly, monthly }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardExport {
    /// Top identities of all time.
    pub all_time: Vec<LeaderboardEntry>,
    /// Top identities of the last year.
    pub yearly: Vec<LeaderboardEntry>,
    /// Top identities of the last month.
    pub monthly: Vec<LeaderboardEntry>,
}

/// Collect the top [`EXPORT_LIMIT`] identities of each window from one
/// overview read.
pub async fn build_export(service: &LeaderboardService) -> Result<LeaderboardExport, QueryError> {
    let overview = service
        .get_overview_at(PageRequest::first(EXPORT_LIMIT), Utc::now())
        .await?;

    Ok(LeaderboardExport {
        all_time: overview.all_time,
        yearly: overview.yearly,
        monthly: overview.monthly,
    })
}

/// Build the export and write it to `path` as pretty-printed JSON,
/// creating parent directories as needed.
pub async fn write_export(
    service: &LeaderboardService,
    path: &Path,
) -> Result<LeaderboardExport, AppError> {
    let export = build_export(service).await?;
    let json = serde_json::to_vec_pretty(&export)?;

    let io_err = |source| AppError::Export {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, json).await.map_err(io_err)?;

    info!(
        path = %path.display(),
        all_time = export.all_time.len(),
        yearly = export.yearly.len(),
        monthly = export.monthly.len(),
        "Leaderboard exported"
    );
    Ok(export)
}
