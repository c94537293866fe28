//! tabs CLI — inspect, describe and build cached tables.
//!
//! Provides `tabs list`, `tabs describe`, `tabs deps`, `tabs fetch` and
//! `tabs clean` over the tables registered in this binary.

#![warn(missing_docs)]

mod commands;
mod demo;
mod logging;
mod project;

use std::process;

use clap::{Parser, Subcommand};
use tabs_common::Value;

/// tabs — declarative, cached tables.
#[derive(Parser, Debug)]
#[command(name = "tabs", version, about = "Build and cache tabular datasets")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `tabs.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every registered table.
    List,
    /// Print a table's documentation.
    Describe {
        /// Table name.
        name: String,
        /// Include post-processors.
        #[arg(long)]
        full: bool,
    },
    /// Show the tables a table depends on.
    Deps {
        /// Table name.
        name: String,
        /// Print the full build order instead of direct dependencies.
        #[arg(long)]
        transitive: bool,
    },
    /// Fetch a table, computing and caching it if needed.
    Fetch(FetchArgs),
    /// Remove artifacts of a table left behind by earlier configurations.
    Clean {
        /// Table name.
        name: String,
        /// Keyword arguments (`key=value`), overriding `tabs.toml`.
        #[arg(long = "set", value_parser = parse_kwarg)]
        set: Vec<(String, Value)>,
    },
}

/// Arguments for the `tabs fetch` subcommand.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Table name.
    pub name: String,

    /// Ignore any cached artifact and recompute.
    #[arg(long)]
    pub rebuild: bool,

    /// Do not write the computed table to the cache.
    #[arg(long)]
    pub no_cache: bool,

    /// Fetch every dependency first, in build order.
    #[arg(long)]
    pub with_deps: bool,

    /// Keyword arguments (`key=value`), overriding `tabs.toml`.
    #[arg(long = "set", value_parser = parse_kwarg)]
    pub set: Vec<(String, Value)>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to log at debug level.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn parse_kwarg(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), Value::parse(value)))
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = project::Project::load(&global).and_then(|project| {
        logging::init(&global, &project.config.log)?;
        let registry = demo::registry()?;
        match cli.command {
            Command::List => commands::list(&registry),
            Command::Describe { ref name, full } => commands::describe(&registry, name, full),
            Command::Deps {
                ref name,
                transitive,
            } => commands::deps(&registry, &project, name, transitive),
            Command::Fetch(ref args) => commands::fetch(&registry, &project, args, &global),
            Command::Clean { ref name, ref set } => {
                commands::clean(&registry, &project, name, set, &global)
            }
        }
    });

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
