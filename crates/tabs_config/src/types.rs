//! Configuration types deserialized from `tabs.toml`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tabs_common::{Kwargs, Value};

use crate::error::ConfigError;

/// The top-level configuration parsed from `tabs.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Cache location settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
    /// Default keyword arguments per table name.
    #[serde(default)]
    pub tables: BTreeMap<String, toml::Table>,
}

/// Where and how artifacts are stored.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Directory that holds cache artifacts.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// File extension for artifacts, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            extension: default_extension(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".tabs-cache")
}

fn default_extension() -> String {
    "tab".to_string()
}

/// Logging settings.
#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// A `tracing` env-filter directive, e.g. `"info"` or `"tabs_table=debug"`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl ProjectConfig {
    /// Returns the default keyword arguments configured for `table`.
    ///
    /// Tables without a `[tables.<name>]` section get an empty map.
    pub fn table_kwargs(&self, table: &str) -> Result<Kwargs, ConfigError> {
        let Some(section) = self.tables.get(table) else {
            return Ok(Kwargs::new());
        };
        let mut kwargs = Kwargs::new();
        for (key, raw) in section {
            kwargs.insert(key.clone(), scalar_from_toml(table, key, raw)?);
        }
        Ok(kwargs)
    }
}

/// Converts a TOML scalar into a [`Value`]; arrays and tables are rejected.
fn scalar_from_toml(table: &str, key: &str, raw: &toml::Value) -> Result<Value, ConfigError> {
    match raw {
        toml::Value::String(s) => Ok(Value::Str(s.clone())),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::Float(f) => Ok(Value::Float(*f)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Datetime(d) => Ok(Value::Str(d.to_string())),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(ConfigError::ValidationError(
            format!("tables.{table}.{key}: only scalar values are supported"),
        )),
    }
}
