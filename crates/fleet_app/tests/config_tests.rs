//! Tests for configuration loading

use fleet_app::{AppConfig, ConfigError, LogFormat, StoreKind};

#[test]
fn test_empty_document_yields_defaults() {
    let config = AppConfig::from_toml("").unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.store, StoreKind::Postgres);
    assert_eq!(config.log_format, LogFormat::Pretty);
}

#[test]
fn test_overrides() {
    let config = AppConfig::from_toml(
        r#"
        store = "memory"
        log_format = "json"
        locale = "en-US"
        timezone = "America/Manaus"
        max_connections = 4
        odometer_max_increase_percent = 25
        "#,
    )
    .unwrap();

    assert_eq!(config.store, StoreKind::Memory);
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.locale, "en-US");
    assert_eq!(config.timezone().unwrap().name(), "America/Manaus");
    assert_eq!(config.max_connections, 4);
    assert_eq!(config.odometer_max_increase_percent, 25);
}

#[test]
fn test_zero_pool_size_rejected() {
    let result = AppConfig::from_toml("max_connections = 0");
    assert!(matches!(result, Err(ConfigError::InvalidPoolSize)));
}

#[test]
fn test_unknown_timezone_rejected() {
    let result = AppConfig::from_toml(r#"timezone = "Atlantis/Capital""#);
    assert!(matches!(result, Err(ConfigError::UnknownTimezone(tz)) if tz == "Atlantis/Capital"));
}

#[test]
fn test_unknown_log_format_rejected() {
    let result = AppConfig::from_toml(r#"log_format = "xml""#);
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_malformed_locale_rejected() {
    let result = AppConfig::from_toml(r#"locale = "not a locale""#);
    assert!(matches!(result, Err(ConfigError::InvalidLocale(_))));
}
