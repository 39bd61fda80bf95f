//! Single-identity stat lookups.

use plustwo_db::ScoreStore;
use plustwo_types::{Identity, ScoreRecord};

use crate::error::QueryError;

/// Resolves one participant's full record.
#[derive(Clone)]
pub struct IdentityService {
    store: ScoreStore,
}

impl IdentityService {
    /// Create a service reading from `store`.
    pub const fn new(store: ScoreStore) -> Self {
        Self { store }
    }

    /// Look up `raw` after case-folding it.
    ///
    /// The record is returned verbatim; a record whose net count disagrees
    /// with its tallies is logged but still served.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidQuery`] if `raw` is blank (before any
    /// store access), [`QueryError::NotFound`] if no record matches, or a
    /// store error.
    pub async fn lookup(&self, raw: &str) -> Result<ScoreRecord, QueryError> {
        let identity = Identity::parse(raw)
            .ok_or_else(|| QueryError::InvalidQuery("username must not be empty".to_owned()))?;

        let record = self
            .store
            .get_one(&identity)
            .await?
            .ok_or_else(|| QueryError::NotFound(format!("user {identity}")))?;

        if !record.is_consistent() {
            tracing::warn!(
                identity = %record.identity,
                count = record.count,
                positive_count = record.positive_count,
                negative_count = record.negative_count,
                "Stored count disagrees with event tallies"
            );
        }

        Ok(record)
    }
}
