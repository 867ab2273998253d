//! Runtime configuration.
//!
//! Loaded either from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://${KMEDIA_DB_USER}@localhost/kmedia"
//! pool_size = 8
//!
//! [debug]
//! sql = true
//! max_sql_length = 500
//! ```
//!
//! or from the environment (`DATABASE_URL`, `KMEDIA_POOL_SIZE`, `KMEDIA_DEBUG_SQL`,
//! `KMEDIA_MAX_SQL_LENGTH`), after reading a `.env` file when one exists.

use crate::error::{OrmError, OrmResult};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebugConfig {
    /// Emit every statement on the `kmedia_orm.sql` target.
    #[serde(default = "default_true")]
    pub sql: bool,
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            sql: true,
            max_sql_length: default_max_sql_length(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> usize {
    16
}

fn default_max_sql_length() -> usize {
    200
}

impl Config {
    /// Read and validate a TOML config file, expanding `${VAR}` references.
    pub fn load(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw).map_err(|e| match e {
            OrmError::Config(msg) => OrmError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_toml(raw: &str) -> OrmResult<Self> {
        let mut config: Config = toml::from_str(raw)
            .map_err(|e| OrmError::Config(format!("failed to parse config: {e}")))?;
        config.database.url = expand_env_vars(&config.database.url)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the config from environment variables (and `.env`).
    pub fn from_env() -> OrmResult<Self> {
        let _ = dotenvy::dotenv();

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| OrmError::Config("DATABASE_URL is not set".to_string()))?;
        let pool_size = env_parse("KMEDIA_POOL_SIZE")?.unwrap_or_else(default_pool_size);
        let sql = env_parse::<bool>("KMEDIA_DEBUG_SQL")?.unwrap_or(true);
        let max_sql_length =
            env_parse("KMEDIA_MAX_SQL_LENGTH")?.unwrap_or_else(default_max_sql_length);

        let config = Config {
            database: DatabaseConfig { url, pool_size },
            debug: DebugConfig {
                sql,
                max_sql_length,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> OrmResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(OrmError::Config("database.url must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(OrmError::Config("database.pool_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Apply the debug settings to the SQL logger.
    pub fn apply(&self) {
        crate::trace::set_sql_logging(self.debug.sql);
        crate::trace::set_max_sql_length(self.debug.max_sql_length);
    }

    /// Create a connection pool from this config.
    #[cfg(feature = "pool")]
    pub fn create_pool(&self) -> OrmResult<deadpool_postgres::Pool> {
        self.apply();
        crate::pool::create_pool_with_config(&self.database.url, self.database.pool_size)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> OrmResult<Option<T>> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| OrmError::Config(format!("invalid value for {key}: {v}"))),
        Err(_) => Ok(None),
    }
}

fn expand_env_vars(input: &str) -> OrmResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(OrmError::Config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(OrmError::Config("invalid env var reference: ${}".into()));
            }

            let v = std::env::var(&key).map_err(|_| {
                OrmError::Config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
