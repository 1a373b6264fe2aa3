//! Configuration loaded from files and process environment.

mod support;

use std::io::Write;

use draw_oracle::config::{AppConfig, ConfigError};
use draw_oracle::db::RepositoryType;
use draw_oracle::notify::NotifierType;

#[test]
fn test_env_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[server]
port = 4000

[notifier]
recipient = "file@example.com"
"#
    )
    .unwrap();

    support::with_scoped_env(
        &[
            ("PORT", Some("5000")),
            ("NOTIFY_RECIPIENT", None),
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            let mut config = AppConfig::from_file(file.path()).unwrap();
            config.apply_env().unwrap();
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.notifier.recipient, "file@example.com");
            assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_relay_requires_url() {
    support::with_scoped_env(
        &[("NOTIFIER_TYPE", Some("relay")), ("MAIL_RELAY_URL", None)],
        || {
            let mut config = AppConfig::default();
            config.apply_env().unwrap();
            assert_eq!(config.notifier.notifier_type, NotifierType::Relay);
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        },
    );
}

#[test]
fn test_bad_port_is_rejected() {
    support::with_scoped_env(&[("PORT", Some("not-a-port"))], || {
        let mut config = AppConfig::default();
        assert!(matches!(config.apply_env(), Err(ConfigError::Invalid(_))));
    });
}

#[test]
fn test_database_url_selects_postgres() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/draws")),
        ],
        || {
            let mut config = AppConfig::default();
            config.apply_env().unwrap();
            assert_eq!(config.repository_type().unwrap(), RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_missing_file() {
    let result = AppConfig::from_file("/nonexistent/draw-oracle.toml");
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}
