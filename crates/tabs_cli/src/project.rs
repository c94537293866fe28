//! Project configuration resolution and keyword-argument assembly.

use std::path::PathBuf;

use tabs_common::{Kwargs, Value};
use tabs_config::ProjectConfig;
use tabs_table::{BuildGraph, Definition};

use crate::GlobalArgs;

/// Kwarg naming the directory demo tables write artifacts to.
pub const CACHE_DIR_KWARG: &str = "cache_dir";
/// Kwarg naming the artifact file extension.
pub const EXTENSION_KWARG: &str = "extension";

/// The project directory and its loaded configuration.
pub struct Project {
    /// Directory the configuration was loaded from.
    pub root: PathBuf,
    /// The loaded configuration (defaults when no `tabs.toml` exists).
    pub config: ProjectConfig,
}

impl Project {
    /// Resolves the project root from global CLI args and loads its config.
    ///
    /// If `--config` is given it names either the file or its directory.
    /// Otherwise the nearest `tabs.toml` above the current directory is used,
    /// falling back to the current directory with default settings.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let root = match global.config {
            Some(ref config_path) => {
                let p = PathBuf::from(config_path);
                if p.is_file() {
                    p.parent()
                        .map(|p| p.to_path_buf())
                        .unwrap_or_else(|| PathBuf::from("."))
                } else {
                    p
                }
            }
            None => {
                let cwd = std::env::current_dir()?;
                tabs_config::find_project_root(&cwd).unwrap_or(cwd)
            }
        };
        let config = tabs_config::load_config(&root)?;
        Ok(Self { root, config })
    }

    /// Builds the kwargs for `table`.
    ///
    /// The `[tables.<name>]` sections of `table` and everything it depends on
    /// are layered in build order, so a table's own section wins over its
    /// dependencies' and the dependencies' settings reach it to be forwarded.
    /// Command-line overrides win over all sections, and the cache directory
    /// and extension are filled in from `[cache]` when nothing sets them.
    pub fn kwargs_for(
        &self,
        table: Definition,
        overrides: &[(String, Value)],
    ) -> Result<Kwargs, Box<dyn std::error::Error>> {
        let graph = BuildGraph::resolve(table, Kwargs::new())?;
        let mut kwargs = Kwargs::new();
        for definition in graph.build_order() {
            kwargs = self
                .config
                .table_kwargs(definition.name())?
                .or_defaults(&kwargs);
        }
        for (key, value) in overrides {
            kwargs.insert(key.clone(), value.clone());
        }
        if !kwargs.contains_key(CACHE_DIR_KWARG) {
            let dir = self.root.join(&self.config.cache.dir);
            kwargs.insert(CACHE_DIR_KWARG, dir.display().to_string());
        }
        if !kwargs.contains_key(EXTENSION_KWARG) {
            kwargs.insert(EXTENSION_KWARG, self.config.cache.extension.clone());
        }
        Ok(kwargs)
    }
}
