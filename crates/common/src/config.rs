//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Default number of pooled database connections
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default listen port
const DEFAULT_PORT: u16 = 3000;

/// Where conversations and messages are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!(
                "STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage backend selection
    pub storage_backend: StorageBackend,

    /// Database connection URL, required for the Postgres backend
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    /// Comma-separated list of allowed origins, or `*`
    pub cors_allowed_origins: String,

    /// Runtime configuration
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    #[mutants::skip] // Reads process env
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::default(),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!(
                "DATABASE_URL is required when STORAGE_BACKEND is postgres"
            ));
        }

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("DATABASE_MAX_CONNECTIONS must be a positive integer"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow!("RUN_MIGRATIONS must be true or false, got '{}'", raw))?,
            None => true,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow!("PORT must be a valid u16: {}", e))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            storage_backend,
            database_url,
            database_max_connections,
            run_migrations,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
