//! Storage configuration loading.
//!
//! # Responsibility
//! - Describe how the storage core connects and where it logs.
//! - Merge defaults, an optional TOML file and `BAS_`-prefixed environment.
//!
//! # Invariants
//! - Later sources override earlier ones: defaults < file < environment.
//! - Loading never opens a database; see `db::connect`.

use crate::db::IN_MEMORY_DBNAME;
use crate::logging::default_log_level;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "bas.toml";
pub const ENV_PREFIX: &str = "BAS_";
const DEFAULT_DBNAME: &str = "bas.sqlite3";

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DbConfig {
    /// Database file path, or `:memory:` for a private in-memory database.
    pub dbname: String,
}

impl DbConfig {
    pub fn new(dbname: impl Into<String>) -> Self {
        Self {
            dbname: dbname.into(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_DBNAME)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DBNAME)
    }
}

/// File logging settings. Logging stays off until `dir` is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DbConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid storage configuration: {}", self.0)
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref())
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self(Box::new(value))
    }
}

impl StoreConfig {
    /// Defaults, then `bas.toml` in the working directory when present, then
    /// environment variables such as `BAS_DATABASE__DBNAME`.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Self::default()));
        let figment = if Path::new(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// Loads `path` over defaults, ignoring the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()?;
        Ok(config)
    }
}
