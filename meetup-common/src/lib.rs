//! # Meetup Admin Common Library
//!
//! Shared code for the meetup administration services including:
//! - Member import normalizer (CSV/TSV spreadsheet exports)
//! - Member record models
//! - SQLite member store
//! - Bootstrap configuration loading
//! - Timestamp helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use import::{run_import, ImportError, ImportPolicy, SynonymTable};
pub use models::{ImportOutcome, MemberRecord, PersistMode, RowRejection};
