//! Configuration loading and representation.
//!
//! Values come from the process environment, after loading a `.env` file
//! from the working directory when one exists.

use std::path::PathBuf;

use pharmastock_inventory::DEFAULT_EXPIRY_WARNING_DAYS;
use pharmastock_observability::{LogConfig, LogFormat};

use crate::error::{StoreError, StoreResult};

pub const ENV_DB: &str = "PHARMASTOCK_DB";
pub const ENV_LOG_FORMAT: &str = "PHARMASTOCK_LOG_FORMAT";
pub const ENV_EXPIRY_WARNING_DAYS: &str = "PHARMASTOCK_EXPIRY_WARNING_DAYS";
pub const ENV_MAX_CONNECTIONS: &str = "PHARMASTOCK_MAX_CONNECTIONS";
pub const ENV_BCRYPT_COST: &str = "PHARMASTOCK_BCRYPT_COST";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// bcrypt accepts work factors in this range.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub log: LogConfig,
    pub expiry_warning_days: u32,
    pub max_connections: u32,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load `.env` (if present) and read the environment.
    pub fn from_env() -> StoreResult<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(StoreError::Config(format!("failed to load .env: {err}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let database_path = match lookup(ENV_DB).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let format = match lookup(ENV_LOG_FORMAT) {
            Some(v) => v
                .parse::<LogFormat>()
                .map_err(|e| StoreError::Config(format!("{ENV_LOG_FORMAT}: {e}")))?,
            None => LogFormat::default(),
        };

        let bcrypt_cost = parse_or(&lookup, ENV_BCRYPT_COST, pharmastock_auth::password::DEFAULT_COST)?;
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(StoreError::Config(format!(
                "{ENV_BCRYPT_COST} must be between 4 and 31, got {bcrypt_cost}"
            )));
        }

        let max_connections = parse_or(&lookup, ENV_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(StoreError::Config(format!("{ENV_MAX_CONNECTIONS} must be at least 1")));
        }

        Ok(Self {
            database_path,
            log: LogConfig {
                format,
                filter: None,
            },
            expiry_warning_days: parse_or(
                &lookup,
                ENV_EXPIRY_WARNING_DAYS,
                DEFAULT_EXPIRY_WARNING_DAYS,
            )?,
            max_connections,
            bcrypt_cost,
        })
    }
}

fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> StoreResult<u32> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|e| StoreError::Config(format!("{key}: invalid value '{raw}': {e}"))),
        None => Ok(default),
    }
}

/// `<data_dir>/pharmastock/pharmastock.db`, falling back to `~/.local/share`.
pub fn default_db_path() -> StoreResult<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or_else(|| {
            StoreError::Config(
                "failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share"
                    .to_string(),
            )
        })?;

    let mut path = base;
    path.push("pharmastock");
    path.push("pharmastock.db");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[(ENV_DB, "/tmp/p.db")])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/p.db"));
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.expiry_warning_days, 90);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.bcrypt_cost, pharmastock_auth::password::DEFAULT_COST);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            (ENV_DB, "/data/x.db"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_EXPIRY_WARNING_DAYS, "30"),
            (ENV_MAX_CONNECTIONS, "2"),
            (ENV_BCRYPT_COST, "4"),
        ]))
        .unwrap();
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.expiry_warning_days, 30);
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for pairs in [
            [(ENV_DB, "/x.db"), (ENV_EXPIRY_WARNING_DAYS, "soon")],
            [(ENV_DB, "/x.db"), (ENV_LOG_FORMAT, "xml")],
            [(ENV_DB, "/x.db"), (ENV_MAX_CONNECTIONS, "0")],
            [(ENV_DB, "/x.db"), (ENV_BCRYPT_COST, "99")],
        ] {
            match Config::from_lookup(lookup(&pairs)) {
                Err(StoreError::Config(_)) => {}
                other => panic!("expected config error for {pairs:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn default_path_ends_with_app_file() {
        let path = default_db_path().unwrap();
        assert!(path.ends_with("pharmastock/pharmastock.db"));
    }
}
