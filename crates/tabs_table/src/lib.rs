//! Declarative, cached table definitions.
//!
//! A table is a named computation: a source that produces a [`Frame`], an
//! ordered chain of [`PostProcessor`]s applied to it, and an output location
//! where the result is cached under a fingerprint of the table's
//! configuration. This crate provides the [`Table`] contract, the fetch state
//! machine that decides between reading the cache and recomputing, the
//! dependency collector and build graph, the name [`Registry`], and the
//! plain-text description reporter.

#![warn(missing_docs)]

pub mod deps;
pub mod describe;
pub mod error;
pub mod fetch;
pub mod frame;
pub mod processor;
pub mod registry;
pub mod table;

pub use deps::{collect_dependencies, BuildGraph};
pub use describe::{describe_lines, write_lines, BANNER_WIDTH};
pub use error::{BoxError, TableError};
pub use fetch::{FetchOptions, FetchState, Fetched};
pub use frame::{Frame, FrameError};
pub use processor::{PostProcessor, ProcessorInfo};
pub use registry::{Catalog, Registry, RegistryError};
pub use table::{Defined, Definition, Table, TableDef};

pub use tabs_cache::{CacheError, Settings};
pub use tabs_common::{Kwargs, Value};
