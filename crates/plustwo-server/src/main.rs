//! Plus-two leaderboard service binary.
//!
//! Loads configuration, connects to the score store, and either serves
//! the HTTP API or writes a static leaderboard export.
//!
//! # Usage
//!
//! ```text
//! plustwo-server                 # serve the API
//! plustwo-server export <path>   # write the top-10 export and exit
//! ```
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `plustwo-config.yaml` (or `PLUSTWO_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the Postgres pool, running migrations if configured
//! 4. Serve or export

mod error;
mod export;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use plustwo_api::AppState;
use plustwo_core::config::{LogFormat, LoggingConfig};
use plustwo_core::{LeaderboardService, ServiceConfig};
use plustwo_db::{PostgresConfig, PostgresPool, ScoreStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Config file read when `PLUSTWO_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "plustwo-config.yaml";

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Serve,
    Export(PathBuf),
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Result<Command, AppError> {
    match args.next().as_deref() {
        None | Some("serve") => Ok(Command::Serve),
        Some("export") => args.next().map(|p| Command::Export(PathBuf::from(p))).ok_or_else(|| {
            AppError::Usage(String::from("usage: plustwo-server export <path>"))
        }),
        Some(other) => Err(AppError::Usage(format!(
            "unknown command `{other}` (expected serve or export <path>)"
        ))),
    }
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the store connection, serving,
/// or the export fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = parse_command(std::env::args().skip(1))?;

    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        config = source,
        host = config.server.host,
        port = config.server.port,
        requests_per_interval = config.rate_limit.requests_per_interval,
        interval_secs = config.rate_limit.interval_secs,
        "plustwo-server starting"
    );

    // 3. Connect to the store.
    let pg_config = PostgresConfig::new(&config.database.url)
        .with_max_connections(config.database.max_connections)
        .with_connect_timeout(config.database.connect_timeout())
        .with_idle_timeout(config.database.idle_timeout())
        .with_query_timeout(config.database.query_timeout());
    let pool = PostgresPool::connect(&pg_config).await.map_err(AppError::from)?;

    if config.database.run_migrations {
        pool.run_migrations().await.map_err(AppError::from)?;
        info!("Migrations applied");
    }

    let store = ScoreStore::postgres(&pool);
    info!(backend = store.backend(), "Score store ready");

    // 4. Serve or export.
    let result = match command {
        Command::Serve => serve(store, &config).await,
        Command::Export(path) => {
            let service = LeaderboardService::new(store);
            export::write_export(&service, &path).await.map(|_| ())
        }
    };

    pool.close().await;
    result?;
    Ok(())
}

async fn serve(store: ScoreStore, config: &ServiceConfig) -> Result<(), AppError> {
    let state = Arc::new(AppState::new(store, config));
    plustwo_api::start_server(&config.server, state).await?;
    Ok(())
}

/// Load configuration from `PLUSTWO_CONFIG` or `plustwo-config.yaml`.
///
/// A missing default file falls back to built-in defaults with
/// environment overrides applied. A missing file named explicitly by
/// `PLUSTWO_CONFIG` is an error. Returns the config and where it came from.
fn load_config() -> Result<(ServiceConfig, String), AppError> {
    if let Ok(explicit) = std::env::var("PLUSTWO_CONFIG") {
        let config = ServiceConfig::from_file(Path::new(&explicit))?;
        return Ok((config, explicit));
    }

    let config_path = Path::new(DEFAULT_CONFIG_PATH);
    if config_path.exists() {
        let config = ServiceConfig::from_file(config_path)?;
        Ok((config, String::from(DEFAULT_CONFIG_PATH)))
    } else {
        Ok((ServiceConfig::from_env()?, String::from("defaults")))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn no_arguments_serves() {
        assert_eq!(parse_command(args(&[])).unwrap(), Command::Serve);
        assert_eq!(parse_command(args(&["serve"])).unwrap(), Command::Serve);
    }

    #[test]
    fn export_needs_a_path() {
        assert_eq!(
            parse_command(args(&["export", "out/leaderboard.json"])).unwrap(),
            Command::Export(PathBuf::from("out/leaderboard.json"))
        );
        assert!(matches!(
            parse_command(args(&["export"])),
            Err(AppError::Usage(_))
        ));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            parse_command(args(&["dance"])),
            Err(AppError::Usage(_))
        ));
    }
}
