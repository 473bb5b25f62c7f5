//! Bootstrap configuration
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments / environment variables (applied by the binary
//!    through [`ConfigOverrides`])
//! 2. TOML configuration file
//! 3. Compiled defaults
//!
//! A missing TOML file is not an error: the service starts on defaults and
//! logs a warning. A file that exists but does not parse is a
//! [`Error::Config`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::import::{ImportPolicy, MemberField, SynonymTable};
use crate::models::PersistMode;
use crate::{Error, Result};

/// Application directory name under the platform config/data dirs
const APP_DIR: &str = "meetup-admin";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// SQLite database file; platform data dir when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub import: ImportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Member import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub policy: ImportPolicy,

    #[serde(default)]
    pub persist_mode: PersistMode,

    /// Rows per multi-row INSERT statement
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Rows per page in the member list
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    /// Upper bound on an uploaded file
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Extra recognized headers, keyed by canonical field name
    #[serde(default)]
    pub extra_synonyms: BTreeMap<String, Vec<String>>,
}

fn default_port() -> u16 {
    5740
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_page_size() -> i64 {
    100
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            database_path: None,
            logging: LoggingConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            policy: ImportPolicy::default(),
            persist_mode: PersistMode::default(),
            batch_size: default_batch_size(),
            page_size: default_page_size(),
            max_upload_bytes: default_max_upload_bytes(),
            extra_synonyms: BTreeMap::new(),
        }
    }
}

impl ImportConfig {
    /// Built-in synonym table extended with `extra_synonyms`.
    ///
    /// Unknown field names are a configuration error.
    pub fn synonym_table(&self) -> Result<SynonymTable> {
        let mut table = SynonymTable::default();
        for (field_name, headers) in &self.extra_synonyms {
            let field: MemberField = field_name
                .parse()
                .map_err(|e: String| Error::Config(format!("import.extra_synonyms: {}", e)))?;
            for header in headers {
                table = table.with_synonym(header, field);
            }
        }
        Ok(table)
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load `path` (or the platform default path); defaults if missing
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            warn!("Config file not found at {}, using built-in defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply command-line/environment values on top of the file values
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.bind_address = bind_address;
        }
        if let Some(database_path) = overrides.database_path {
            self.database_path = Some(database_path);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }

    /// Configured database path, or the platform default
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// `<config dir>/meetup-admin/meetup-mi.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("meetup-mi.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./meetup_data"))
        .join("members.db")
}
