//! Loader configuration
//!
//! Values come from the environment (optionally via a `.env` file); CLI
//! flags override them in `main`.

use opentrain_common::OpentrainError;
use std::str::FromStr;

use crate::db::DbConfig;

/// Rows staged between commits when nothing else is configured
pub const DEFAULT_COMMIT_EVERY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub database: DbConfig,
    pub commit_every: usize,
    /// Upper bound on lines considered; `None` reads the whole file
    pub max_lines: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            commit_every: DEFAULT_COMMIT_EVERY,
            max_lines: None,
        }
    }
}

impl IngestConfig {
    /// Load `.env` if present, then read the environment
    pub fn load() -> opentrain_common::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Read configuration from environment variables
    ///
    /// - `DATABASE_URL`
    /// - `DB_MAX_CONNECTIONS`
    /// - `DB_CONNECT_TIMEOUT` (seconds)
    /// - `INGEST_COMMIT_EVERY`
    /// - `INGEST_MAX_LINES`
    pub fn from_env() -> opentrain_common::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            database: DbConfig {
                url: std::env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: env_parse("DB_MAX_CONNECTIONS")?
                    .unwrap_or(defaults.database.max_connections),
                connect_timeout_secs: env_parse("DB_CONNECT_TIMEOUT")?
                    .unwrap_or(defaults.database.connect_timeout_secs),
            },
            commit_every: env_parse("INGEST_COMMIT_EVERY")?.unwrap_or(defaults.commit_every),
            max_lines: env_parse("INGEST_MAX_LINES")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> opentrain_common::Result<()> {
        if self.database.url.is_empty() {
            return Err(OpentrainError::config("Database URL cannot be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(OpentrainError::config(
                "DB_MAX_CONNECTIONS must be greater than 0",
            ));
        }
        if self.commit_every == 0 {
            return Err(OpentrainError::config("commit_every must be greater than 0"));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> opentrain_common::Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| OpentrainError::invalid_value(key, &value)),
        Err(_) => Ok(None),
    }
}
