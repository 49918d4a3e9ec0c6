//! Runtime configuration from the environment (`.env` is loaded by the binary first).

use crate::error::ConfigError;
use crate::routes::DEFAULT_BODY_LIMIT;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// PostgreSQL URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub body_limit: usize,
}

impl AppConfig {
    /// Read `DATABASE_URL`, `BIND_ADDR` and `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind.clone(),
        })?;
        let body_limit = match lookup("BODY_LIMIT_BYTES") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "BODY_LIMIT_BYTES",
                value: v.clone(),
            })?,
            None => DEFAULT_BODY_LIMIT,
        };
        Ok(Self {
            database_url,
            bind_addr,
            body_limit,
        })
    }
}
