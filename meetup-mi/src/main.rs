//! meetup-mi (Member Import) - member spreadsheet import service
//!
//! Accepts Meetup member exports and hand-made spreadsheets (CSV or TSV,
//! French or English headers), normalizes them and keeps the member table.
//!
//! Settings: command line / environment, then the TOML config file, then
//! compiled defaults.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use meetup_common::config::{default_config_path, LoggingConfig, TomlConfig};
use meetup_common::db::init_database;
use meetup_mi::cli::Args;
use meetup_mi::{build_router, AppState};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let config = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(args.overrides());

    init_tracing(&config.logging)?;

    info!(
        "Starting Meetup Member Import (meetup-mi) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // load_or_default ran before the subscriber existed
    match config_path {
        Some(path) if path.exists() => info!("Configuration: {}", path.display()),
        Some(path) => warn!("Config file not found at {}, using defaults", path.display()),
        None => warn!("Could not determine config directory, using defaults"),
    }

    let db_path = config.resolved_database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool, config.import.clone()).context("Invalid import configuration")?;
    info!(
        synonyms = state.synonyms.len(),
        persist_mode = ?state.import.persist_mode,
        batch_size = state.import.batch_size,
        "Import settings loaded"
    );
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("meetup-mi listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level; output goes to the configured
/// file when set, stderr otherwise
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("{},tower_http=debug", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
