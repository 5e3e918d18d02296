use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {name} '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a database the service runs on an in-memory catalog.
    pub database_url: Option<String>,
    pub stock_decrement_timeout: Duration,
    /// Sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse("PORT", lookup("PORT"), 8080u16)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let stock_decrement_timeout = seconds(
            "STOCK_DECREMENT_TIMEOUT_SECS",
            lookup("STOCK_DECREMENT_TIMEOUT_SECS"),
            10,
        )?;
        let session_idle_timeout = seconds(
            "SESSION_IDLE_TIMEOUT_SECS",
            lookup("SESSION_IDLE_TIMEOUT_SECS"),
            30 * 60,
        )?;

        Ok(Self {
            host,
            port,
            database_url,
            stock_decrement_timeout,
            session_idle_timeout,
        })
    }
}

fn seconds(name: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let secs = parse(name, value, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).expect("defaults are valid");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.database_url.is_none());
        assert_eq!(config.stock_decrement_timeout, Duration::from_secs(10));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn explicit_values() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/agridirect"),
            ("STOCK_DECREMENT_TIMEOUT_SECS", "3"),
            ("SESSION_IDLE_TIMEOUT_SECS", "600"),
        ])
        .expect("valid config");
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/agridirect")
        );
        assert_eq!(config.stock_decrement_timeout, Duration::from_secs(3));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(600));
    }

    #[test]
    fn blank_database_url_means_none() {
        let config = config(&[("DATABASE_URL", "  ")]).expect("valid config");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = config(&[("PORT", "eighty")]).expect_err("invalid port");
        assert!(err.to_string().starts_with("Invalid PORT 'eighty'"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(config(&[("STOCK_DECREMENT_TIMEOUT_SECS", "0")]).is_err());
        assert!(config(&[("SESSION_IDLE_TIMEOUT_SECS", "0")]).is_err());
    }
}
