use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),

    #[error("DB_PORT must be a valid port number, got '{0}'")]
    InvalidDbPort(String),

    #[error("STORAGE_BACKEND must be 'postgres' or 'memory', got '{0}'")]
    InvalidBackend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => f.write_str("postgres"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: StorageBackend,
    pub database: DatabaseConfig,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, applying defaults for every
    /// unset variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "8080");
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;

        let backend: StorageBackend = var("STORAGE_BACKEND", "postgres").parse()?;

        let url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let db_port = var("DB_PORT", "5432");
                let db_port: u16 = db_port
                    .parse()
                    .map_err(|_| ConfigError::InvalidDbPort(db_port))?;
                format!(
                    "postgres://{}:{}@{}:{}/{}",
                    var("DB_USER", "postgres"),
                    var("DB_PASSWORD", "postgres"),
                    var("DB_HOST", "localhost"),
                    db_port,
                    var("DB_NAME", "clean_arch_db"),
                )
            }
        };

        Ok(Self {
            server: ServerConfig {
                host: var("HOST", "0.0.0.0"),
                port,
            },
            backend,
            database: DatabaseConfig { url },
        })
    }
}
