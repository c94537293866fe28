//! Configuration file loading and validation.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::ProjectConfig;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "tabs.toml";

/// Loads and validates `tabs.toml` from a project directory.
///
/// A directory without a configuration file yields the defaults.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(ProjectConfig::default());
    }
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tabs.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Walks up from `start` looking for the nearest directory containing `tabs.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.cache.dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("cache.dir".to_string()));
    }
    let ext = config.cache.extension.as_str();
    if ext.is_empty() {
        return Err(ConfigError::MissingField("cache.extension".to_string()));
    }
    if ext.starts_with('.') || ext.contains('/') {
        return Err(ConfigError::ValidationError(format!(
            "cache.extension must be a bare extension, got '{ext}'"
        )));
    }
    for table in config.tables.keys() {
        config.table_kwargs(table)?;
    }
    Ok(())
}
