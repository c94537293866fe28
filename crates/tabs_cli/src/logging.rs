//! Tracing subscriber setup.

use tabs_config::LogConfig;
use tracing_subscriber::EnvFilter;

use crate::GlobalArgs;

/// Picks the filter directive: `RUST_LOG` first, then `-v`/`-q`, then the config.
fn filter_directive(global: &GlobalArgs, config: &LogConfig) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env.is_empty() {
            return env;
        }
    }
    if global.verbose {
        "debug".to_string()
    } else if global.quiet {
        "error".to_string()
    } else {
        config.filter.clone()
    }
}

/// Installs a stderr fmt subscriber. Safe to call more than once.
pub fn init(global: &GlobalArgs, config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(filter_directive(global, config))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
