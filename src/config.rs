use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{anyhow, Result};
use tracing::info;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3050";
const DEFAULT_MAX_CONNECTIONS: &str = "5";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if let Some(url) = &database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow!("DATABASE_URL must be a postgres:// or postgresql:// URL"));
            }
        }

        let max_connections: u32 = try_load(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        Ok(Self {
            bind_addr: try_load(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?,
            database_url,
            max_connections,
        })
    }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
