//! Command-line arguments
//!
//! Every option also reads an environment variable, so the service can be
//! configured without a config file.

use std::path::PathBuf;

use clap::Parser;
use meetup_common::config::ConfigOverrides;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "meetup-mi")]
#[command(about = "Member Import service for the meetup admin")]
#[command(version)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MEETUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MEETUP_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "MEETUP_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "MEETUP_DATABASE")]
    pub database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MEETUP_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// Values that take priority over the config file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            bind_address: self.bind_address.clone(),
            database_path: self.database.clone(),
            log_level: self.log_level.clone(),
        }
    }
}
