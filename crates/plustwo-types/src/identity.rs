//! Case-normalized participant identity.
//!
//! Chat usernames arrive in whatever case the participant typed them.
//! The store keys every record by the lowercased name, so every lookup
//! goes through [`Identity::parse`] before it reaches the store.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The unique, lowercased key of a tracked participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct Identity(String);

impl Identity {
    /// Normalize a raw username into an identity.
    ///
    /// Surrounding whitespace is stripped and the remainder is lowercased.
    /// Returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    /// Wrap a key that is already normalized (e.g. read back from the store).
    pub const fn from_normalized(key: String) -> Self {
        Self(key)
    }

    /// The normalized key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identity and return the normalized key.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
