//! Configuration file loading and graceful degradation
//!
//! - Missing TOML file → defaults, no failure
//! - Malformed TOML file → configuration error
//! - Valid TOML file → values loaded, unspecified keys defaulted

use meetup_common::config::{ConfigOverrides, TomlConfig};
use meetup_common::import::{EmailPolicy, IdentityField};
use meetup_common::{Error, PersistMode};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_config_file_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number").unwrap();

    let result = TomlConfig::load_or_default(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))), "got {:?}", result);
}

#[test]
fn test_config_file_values_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
port = 6000
database_path = "/var/lib/meetup/members.db"

[logging]
level = "debug"

[import]
persist_mode = "upsert"

[import.policy]
identity_field = "name_or_id"
email_policy = "mandatory"
"#
    )
    .unwrap();

    let config = TomlConfig::load_or_default(Some(file.path())).unwrap();
    assert_eq!(config.port, 6000);
    assert_eq!(config.bind_address, "127.0.0.1");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.resolved_database_path(),
        PathBuf::from("/var/lib/meetup/members.db")
    );
    assert_eq!(config.import.persist_mode, PersistMode::Upsert);
    assert_eq!(config.import.policy.identity_field, IdentityField::NameOrId);
    assert_eq!(config.import.policy.email_policy, EmailPolicy::Mandatory);
    assert_eq!(config.import.batch_size, 50);
}

#[test]
fn test_overrides_apply_over_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 6000\n[logging]\nlevel = \"warn\"").unwrap();

    let config = TomlConfig::load_or_default(Some(file.path()))
        .unwrap()
        .with_overrides(ConfigOverrides {
            port: Some(7000),
            ..ConfigOverrides::default()
        });
    assert_eq!(config.port, 7000);
    assert_eq!(config.logging.level, "warn");
}
