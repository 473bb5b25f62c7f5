//! meetup-mi library - Member Import service
//!
//! Uploads of Meetup member exports and hand-made spreadsheets are
//! normalized by `meetup_common::import` and stored in the member table.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use meetup_common::config::ImportConfig;
use meetup_common::SynonymTable;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod error;
pub mod pagination;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Header synonyms (built-in table plus configured extras)
    pub synonyms: Arc<SynonymTable>,
    /// Import policy, persist mode and size limits
    pub import: ImportConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create application state, resolving the configured synonym table
    pub fn new(db: SqlitePool, import: ImportConfig) -> meetup_common::Result<Self> {
        let synonyms = import.synonym_table()?;
        Ok(Self {
            db,
            synonyms: Arc::new(synonyms),
            import,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.import.max_upload_bytes;

    Router::new()
        .merge(api::import_routes())
        .merge(api::member_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
