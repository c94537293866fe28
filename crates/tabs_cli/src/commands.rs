//! Implementations of the `tabs` subcommands.
//!
//! Each command returns the process exit code on success.

use std::error::Error;
use std::path::Path;

use tabs_cache::ArtifactStore;
use tabs_common::Value;
use tabs_table::{BuildGraph, FetchOptions, Fetched, Registry, Table};

use crate::project::Project;
use crate::{FetchArgs, GlobalArgs};

/// `tabs list`: one table name per line.
pub fn list(registry: &Registry) -> Result<i32, Box<dyn Error>> {
    for name in registry {
        println!("{name}");
    }
    Ok(0)
}

/// `tabs describe`: prints the table's documentation.
pub fn describe(registry: &Registry, name: &str, full: bool) -> Result<i32, Box<dyn Error>> {
    let definition = registry.definition(name)?;
    definition.instantiate(Default::default()).describe(full);
    Ok(0)
}

/// `tabs deps`: direct dependencies, or the full build order.
pub fn deps(
    registry: &Registry,
    project: &Project,
    name: &str,
    transitive: bool,
) -> Result<i32, Box<dyn Error>> {
    let definition = registry.definition(name)?;
    let kwargs = project.kwargs_for(definition, &[])?;
    if transitive {
        let graph = BuildGraph::resolve(definition, kwargs)?;
        for table in graph.build_order() {
            println!("{table}");
        }
    } else {
        for table in definition.instantiate(kwargs).dependencies() {
            println!("{table}");
        }
    }
    Ok(0)
}

/// `tabs fetch`: fetches the table (and optionally its dependencies first).
pub fn fetch(
    registry: &Registry,
    project: &Project,
    args: &FetchArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn Error>> {
    let definition = registry.definition(&args.name)?;
    let kwargs = project.kwargs_for(definition, &args.set)?;
    let options = FetchOptions {
        rebuild: args.rebuild,
        cache: !args.no_cache,
    };

    let fetched: Vec<(&str, Fetched)> = if args.with_deps {
        BuildGraph::resolve(definition, kwargs)?
            .fetch_all(options)?
            .into_iter()
            .map(|(d, f)| (d.name(), f))
            .collect()
    } else {
        vec![(
            definition.name(),
            definition.instantiate(kwargs).fetch(options)?,
        )]
    };

    for (name, result) in &fetched {
        if let Some(ref e) = result.persist_error {
            eprintln!("warning: {name} was computed but not cached: {e}");
        }
        if !global.quiet {
            println!(
                "{name}: {} rows, {:?} ({})",
                result.data.len(),
                result.state(),
                result.location.display()
            );
        }
    }
    Ok(0)
}

/// `tabs clean`: removes artifacts of earlier configurations of a table.
pub fn clean(
    registry: &Registry,
    project: &Project,
    name: &str,
    overrides: &[(String, Value)],
    global: &GlobalArgs,
) -> Result<i32, Box<dyn Error>> {
    let definition = registry.definition(name)?;
    let table = definition.instantiate(project.kwargs_for(definition, overrides)?);
    let removed = prune_stale(table.as_ref())?;
    if !global.quiet {
        println!("{name}: removed {removed} stale artifact(s)");
    }
    Ok(0)
}

/// Removes sibling artifacts sharing the current artifact's base name.
fn prune_stale(table: &dyn Table) -> Result<usize, Box<dyn Error>> {
    let current = table.output()?;
    let dir = current.parent().unwrap_or(Path::new("."));
    let ext = current
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| format!("{} has no extension", current.display()))?;
    let base = current
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| stem.rsplit_once('_'))
        .map(|(base, _)| base)
        .ok_or_else(|| format!("{} is not a fingerprinted filename", current.display()))?;
    Ok(ArtifactStore::prune(dir, base, ext, &current)?)
}
