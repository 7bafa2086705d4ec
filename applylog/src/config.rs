//! Process configuration read from the environment.

use std::{net::SocketAddr, str::FromStr};
use thiserror::Error;

use applylog_core::page::MAX_OFFSET;

pub const DEFAULT_DATABASE: &str = "job_tracker";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 1000;
pub const DEFAULT_LOG_FILTER: &str = "applylog=info,tower_http=info";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    MongoDb,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreKind::MongoDb),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store '{other}', expected mongodb or memory")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub store: StoreKind,
    /// Required when `store` is [`StoreKind::MongoDb`].
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub bind: SocketAddr,
    /// Upper bound accepted for the `limit` query parameter.
    pub max_page_size: u64,
}

impl ServerConfig {
    /// Reads `MONGO_URI`, `MONGO_DATABASE`, `APPLYLOG_STORE`, `APPLYLOG_BIND` and
    /// `APPLYLOG_MAX_PAGE_SIZE` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let store = parse_or("APPLYLOG_STORE", read("APPLYLOG_STORE"), StoreKind::MongoDb)?;
        let mongo_uri = read("MONGO_URI");
        if store == StoreKind::MongoDb && mongo_uri.is_none() {
            return Err(ConfigError::Missing("MONGO_URI"));
        }
        let bind: SocketAddr = parse(
            "APPLYLOG_BIND",
            read("APPLYLOG_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
        )?;
        let max_page_size = parse_or(
            "APPLYLOG_MAX_PAGE_SIZE",
            read("APPLYLOG_MAX_PAGE_SIZE"),
            DEFAULT_MAX_PAGE_SIZE,
        )?;
        if max_page_size == 0 || max_page_size > MAX_OFFSET {
            return Err(ConfigError::Invalid {
                var: "APPLYLOG_MAX_PAGE_SIZE",
                value: max_page_size.to_string(),
                reason: format!("must be between 1 and {MAX_OFFSET}"),
            });
        }

        Ok(Self {
            store,
            mongo_uri,
            mongo_database: read("MONGO_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            bind,
            max_page_size,
        })
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.map_or(Ok(default), |value| parse(var, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_uri_is_set() {
        let config = config(&[("MONGO_URI", "mongodb://localhost:27017")]).unwrap();

        assert_eq!(config.store, StoreKind::MongoDb);
        assert_eq!(config.mongo_database, DEFAULT_DATABASE);
        assert_eq!(config.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_page_size, DEFAULT_MAX_PAGE_SIZE);
    }

    #[test]
    fn mongodb_requires_a_uri() {
        assert_eq!(config(&[]), Err(ConfigError::Missing("MONGO_URI")));
        assert_eq!(config(&[("MONGO_URI", "  ")]), Err(ConfigError::Missing("MONGO_URI")));
    }

    #[test]
    fn memory_store_needs_no_uri() {
        let config = config(&[("APPLYLOG_STORE", "Memory"), ("APPLYLOG_BIND", "0.0.0.0:9000")]).unwrap();

        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.mongo_uri, None);
        assert_eq!(config.bind.port(), 9000);
    }

    #[test]
    fn invalid_values_are_reported_with_their_variable() {
        let err = config(&[("APPLYLOG_STORE", "memory"), ("APPLYLOG_MAX_PAGE_SIZE", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "APPLYLOG_MAX_PAGE_SIZE", .. }));

        let err = config(&[("APPLYLOG_STORE", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "APPLYLOG_STORE", .. }));

        let err = config(&[("APPLYLOG_STORE", "memory"), ("APPLYLOG_MAX_PAGE_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "APPLYLOG_MAX_PAGE_SIZE", .. }));

        let err = config(&[
            ("APPLYLOG_STORE", "memory"),
            ("APPLYLOG_MAX_PAGE_SIZE", "9223372036854775808"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "APPLYLOG_MAX_PAGE_SIZE", .. }));

        let err = config(&[("APPLYLOG_STORE", "memory"), ("APPLYLOG_BIND", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "APPLYLOG_BIND", .. }));
    }
}
