//! Parsing and validation of `tabs.toml` project configuration files.
//!
//! The configuration names the cache directory and artifact extension, the
//! default log filter, and per-table default keyword arguments.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_project_root, load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
