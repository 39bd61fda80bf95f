//! Error types for the server binary.
//!
//! [`AppError`] is the top-level error type that wraps every failure
//! mode during startup, serving, and export.

use std::path::PathBuf;

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: plustwo_core::ConfigError,
    },

    /// Connecting to or migrating the store failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: plustwo_db::DbError,
    },

    /// A leaderboard query failed during export.
    #[error("query error: {source}")]
    Query {
        /// The underlying query error.
        #[from]
        source: plustwo_core::QueryError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: plustwo_api::ServerError,
    },

    /// The export file could not be written.
    #[error("cannot write export to {}: {source}", path.display())]
    Export {
        /// Destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The export could not be serialized.
    #[error("cannot serialize export: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The command line was not understood.
    #[error("{0}")]
    Usage(String),
}
