//! Environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use notesum_bedrock::cache::DEFAULT_CAPACITY;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub model_id: String,
    pub region: String,
    pub pool_size: usize,
    pub sample_rows: usize,
    pub cache_capacity: usize,
    pub stage_timeout: Option<Duration>,
    pub ingest_on_startup: bool,
    pub purge_on_shutdown: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Unset or empty
    /// variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pool_size = parse(&get, "NOTESUM_POOL_SIZE", 5usize)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                var: "NOTESUM_POOL_SIZE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let stage_timeout = match get("NOTESUM_STAGE_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value::<u64>(
                "NOTESUM_STAGE_TIMEOUT_SECS",
                &raw,
            )?)),
            None => None,
        };

        Ok(Self {
            bind: parse(&get, "NOTESUM_BIND", SocketAddr::from(([0, 0, 0, 0], 8000)))?,
            db_path: get("NOTESUM_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("db/healthcare_data.db")),
            data_dir: get("NOTESUM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            model_id: get("NOTESUM_MODEL_ID")
                .unwrap_or_else(|| "us.anthropic.claude-sonnet-4-20250514-v1:0".to_string()),
            region: get("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            pool_size,
            sample_rows: parse(&get, "NOTESUM_SAMPLE_ROWS", 3usize)?,
            cache_capacity: parse(&get, "NOTESUM_CACHE_CAPACITY", DEFAULT_CAPACITY)?,
            stage_timeout,
            ingest_on_startup: parse_flag(&get, "NOTESUM_INGEST_ON_STARTUP", true)?,
            purge_on_shutdown: parse_flag(&get, "NOTESUM_PURGE_ON_SHUTDOWN", false)?,
        })
    }
}

fn parse<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => parse_value(var, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag<G>(get: &G, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(var) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:8000");
        assert_eq!(config.db_path, PathBuf::from("db/healthcare_data.db"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.sample_rows, 3);
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.stage_timeout, None);
        assert!(config.ingest_on_startup);
        assert!(!config.purge_on_shutdown);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("NOTESUM_BIND", "127.0.0.1:9000"),
            ("NOTESUM_POOL_SIZE", "2"),
            ("NOTESUM_STAGE_TIMEOUT_SECS", "30"),
            ("NOTESUM_INGEST_ON_STARTUP", "no"),
            ("NOTESUM_PURGE_ON_SHUTDOWN", "TRUE"),
            ("NOTESUM_MODEL_ID", "us.anthropic.claude-haiku-4-5"),
            ("NOTESUM_CACHE_CAPACITY", "16"),
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.stage_timeout, Some(Duration::from_secs(30)));
        assert!(!config.ingest_on_startup);
        assert!(config.purge_on_shutdown);
        assert_eq!(config.model_id, "us.anthropic.claude-haiku-4-5");
        assert_eq!(config.cache_capacity, 16);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = config(&[("NOTESUM_POOL_SIZE", "  ")]).unwrap();
        assert_eq!(config.pool_size, 5);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(
            config(&[("NOTESUM_POOL_SIZE", "five")]),
            Err(ConfigError::Invalid { var: "NOTESUM_POOL_SIZE", .. })
        ));
        assert!(config(&[("NOTESUM_POOL_SIZE", "0")]).is_err());
        assert!(config(&[("NOTESUM_INGEST_ON_STARTUP", "maybe")]).is_err());
        assert!(config(&[("NOTESUM_BIND", "localhost")]).is_err());
        assert!(config(&[("NOTESUM_STAGE_TIMEOUT_SECS", "-1")]).is_err());
    }
}
