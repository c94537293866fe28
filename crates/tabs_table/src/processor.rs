//! Post-processing steps applied to a table's source data.

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::frame::Frame;
use crate::table::Definition;

type ProcessFn = dyn Fn(Frame) -> Result<Frame, BoxError> + Send + Sync;

/// A named transformation from one [`Frame`] to the next.
///
/// The name identifies the step in fingerprints and descriptions, and any
/// tables the step reads from are declared alongside it with
/// [`depends_on`](Self::depends_on).
#[derive(Clone)]
pub struct PostProcessor {
    name: &'static str,
    doc: &'static str,
    func: Arc<ProcessFn>,
    dependencies: Vec<Definition>,
}

impl PostProcessor {
    /// Creates a step with no declared dependencies.
    pub fn new<F>(name: &'static str, doc: &'static str, func: F) -> Self
    where
        F: Fn(Frame) -> Result<Frame, BoxError> + Send + Sync + 'static,
    {
        Self {
            name,
            doc,
            func: Arc::new(func),
            dependencies: Vec::new(),
        }
    }

    /// Declares that this step reads from another table.
    pub fn depends_on(mut self, table: Definition) -> Self {
        self.dependencies.push(table);
        self
    }

    /// The step's identifier.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The step's documentation.
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Tables this step reads from, in declaration order.
    pub fn dependencies(&self) -> &[Definition] {
        &self.dependencies
    }

    /// Runs the step.
    pub fn apply(&self, frame: Frame) -> Result<Frame, BoxError> {
        (self.func)(frame)
    }

    /// Name and documentation of this step.
    pub fn info(&self) -> ProcessorInfo {
        ProcessorInfo {
            name: self.name,
            doc: self.doc,
        }
    }
}

impl fmt::Debug for PostProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostProcessor")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Name and documentation of a post-processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorInfo {
    /// The step's identifier.
    pub name: &'static str,
    /// The step's documentation.
    pub doc: &'static str,
}
