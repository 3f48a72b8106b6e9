//! Application configuration loaded from environment variables.
//!
//! | Variable             | Default                                 |
//! |----------------------|-----------------------------------------|
//! | `RPC_URL`            | `https://soroban-testnet.stellar.org`   |
//! | `CONTRACT_ID`        | required                                |
//! | `DATABASE_URL`       | `sqlite:./escrow_events.db`             |
//! | `API_PORT`           | `3001`                                  |
//! | `POLL_INTERVAL_SECS` | `5`                                     |
//! | `EVENTS_PER_PAGE`    | `100`                                   |
//! | `START_LEDGER`       | `0`                                     |

use std::str::FromStr;

use crate::errors::{IndexerError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint.
    pub rpc_url: String,
    /// The escrow contract address (Strkey format).
    pub contract_id: String,
    /// SQLite database URL or file path.
    pub database_url: String,
    /// Port for the REST API server.
    pub api_port: u16,
    /// How often (in seconds) to poll the RPC for new events.
    pub poll_interval_secs: u64,
    /// Maximum number of events to fetch per RPC request.
    pub events_per_page: u32,
    /// Ledger to start from if no cursor is saved.
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contract_id = lookup("CONTRACT_ID").ok_or_else(|| {
            IndexerError::Config("CONTRACT_ID environment variable is required".to_string())
        })?;

        Ok(Config {
            rpc_url: lookup("RPC_URL")
                .unwrap_or_else(|| "https://soroban-testnet.stellar.org".to_string()),
            contract_id,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./escrow_events.db".to_string()),
            api_port: parse_or(&lookup, "API_PORT", 3001)?,
            poll_interval_secs: parse_or(&lookup, "POLL_INTERVAL_SECS", 5)?,
            events_per_page: parse_or(&lookup, "EVENTS_PER_PAGE", 100)?,
            start_ledger: parse_or(&lookup, "START_LEDGER", 0)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}: {raw}"))),
    }
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
    fn defaults_apply_when_only_contract_is_set() {
        let config = Config::from_lookup(lookup(&[("CONTRACT_ID", "CESCROW")])).unwrap();
        assert_eq!(config.contract_id, "CESCROW");
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.events_per_page, 100);
        assert_eq!(config.start_ledger, 0);
        assert_eq!(config.database_url, "sqlite:./escrow_events.db");
    }

    #[test]
    fn missing_contract_id_is_an_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, IndexerError::Config(_)));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[("CONTRACT_ID", "C"), ("API_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }
}
