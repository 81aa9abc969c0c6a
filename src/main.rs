//! Ruzma server entry point.
//!
//! Loads configuration, sets up logging, connects to PostgreSQL and serves
//! the deliverable API until a shutdown signal arrives.

use tracing_subscriber::{EnvFilter, fmt};

use ruzma_core::config::{AppConfig, LogFormat};
use ruzma_core::error::AppError;
use ruzma_database::DatabasePool;
use ruzma_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from the file named by `RUZMA_CONFIG`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("RUZMA_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Ruzma v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;

    if config.database.migrate_on_start {
        run_migrations(db.pool()).await?;
    }

    ruzma_api::run_server(config, db).await
}
