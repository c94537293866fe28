//! Error types for table computation and fetching.

use tabs_cache::CacheError;
use tabs_common::KwargTypeError;

/// Error type produced by user-supplied sources and post-processors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by fetching or resolving a table.
///
/// A missing cache artifact is never an error; it triggers recomputation.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The table's source failed to produce a dataset.
    #[error("source of table '{table}' failed: {source}")]
    Source {
        /// Name of the table.
        table: &'static str,
        /// The source's own error.
        source: BoxError,
    },

    /// A post-processor failed.
    #[error("post processor '{processor}' of table '{table}' failed: {source}")]
    PostProcessor {
        /// Name of the table.
        table: &'static str,
        /// Name of the failing post-processor.
        processor: &'static str,
        /// The post-processor's own error.
        source: BoxError,
    },

    /// A keyword argument the table needs was not supplied.
    #[error("table '{table}' requires keyword argument '{key}'")]
    MissingKwarg {
        /// Name of the table.
        table: &'static str,
        /// The missing key.
        key: &'static str,
    },

    /// A keyword argument has the wrong type.
    #[error(transparent)]
    Kwarg(#[from] KwargTypeError),

    /// The cache artifact could not be read, or its name could not be built.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Following declared dependencies leads back to a table already on the path.
    #[error("dependency cycle through table '{table}'")]
    DependencyCycle {
        /// A table that lies on the cycle.
        table: &'static str,
    },
}
