// src/config.rs

use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MONGO_URI: &str = "mongodb://127.0.0.1:27017";
pub const DEFAULT_MONGO_DATABASE: &str = "HospitalManagement";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!(
                "Unknown STORE_BACKEND '{}', expected 'mongo' or 'memory'",
                other
            )),
        }
    }
}

/// Process configuration, read from the environment once `.env` is loaded.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub store_backend: StoreBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid BIND_ADDR '{}'", bind_addr))?;

        let store_backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse::<StoreBackend>()?,
            None => StoreBackend::Mongo,
        };

        Ok(AppConfig {
            bind_addr,
            mongo_uri: lookup("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.to_string()),
            mongo_database: lookup("MONGO_DATABASE")
                .unwrap_or_else(|| DEFAULT_MONGO_DATABASE.to_string()),
            store_backend,
        })
    }
}
