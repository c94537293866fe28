//! The table contract and table definition handles.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tabs_cache::{ArtifactStore, CacheError, Settings};
use tabs_common::Kwargs;
use tracing::{debug, warn};

use crate::describe::{describe_lines, write_lines};
use crate::error::{BoxError, TableError};
use crate::fetch::{FetchOptions, Fetched};
use crate::frame::Frame;
use crate::processor::{PostProcessor, ProcessorInfo};

/// A table bound to a configuration.
///
/// Implementors supply the source, the post-processing chain and the output
/// location; everything else has a default built on those three. Dependencies
/// are declared next to what uses them: the source through
/// [`source_dependencies`](Self::source_dependencies) and each step through
/// [`PostProcessor::depends_on`].
///
/// ```
/// use std::path::PathBuf;
/// use tabs_table::{BoxError, Frame, Kwargs, PostProcessor, Table, TableDef, TableError};
///
/// struct Empty {
///     kwargs: Kwargs,
/// }
///
/// impl TableDef for Empty {
///     const NAME: &'static str = "Empty";
///     const DOC: &'static str = "A table with no rows";
///
///     fn new(kwargs: Kwargs) -> Self {
///         Self { kwargs }
///     }
/// }
///
/// impl Table for Empty {
///     fn kwargs(&self) -> &Kwargs {
///         &self.kwargs
///     }
///
///     fn source(&self) -> Result<Frame, BoxError> {
///         Ok(Frame::new(["id"])?)
///     }
///
///     fn post_processors(&self) -> Vec<PostProcessor> {
///         Vec::new()
///     }
///
///     fn output(&self) -> Result<PathBuf, TableError> {
///         let name = self.cached_filename("empty", "tab", None)?;
///         Ok(std::env::temp_dir().join(name))
///     }
/// }
///
/// let table = Empty::new(Kwargs::new());
/// assert!(table.dependencies().is_empty());
/// ```
pub trait Table: Defined {
    /// The configuration this instance is bound to.
    fn kwargs(&self) -> &Kwargs;

    /// Produces the raw dataset.
    fn source(&self) -> Result<Frame, BoxError>;

    /// Tables the source reads from, in declaration order.
    fn source_dependencies(&self) -> Vec<Definition> {
        Vec::new()
    }

    /// The transformation chain applied to the source data, in order.
    fn post_processors(&self) -> Vec<PostProcessor>;

    /// Location of the cache artifact for this configuration.
    fn output(&self) -> Result<PathBuf, TableError>;

    /// The kwargs `dependency` is bound to when this table reads from it.
    ///
    /// Sources should fetch their dependencies with these kwargs, and
    /// [`BuildGraph::resolve`](crate::BuildGraph::resolve) binds dependencies
    /// the same way, so both resolve to the same artifact. Forwards every
    /// kwarg by default.
    fn dependency_kwargs(&self, _dependency: Definition) -> Kwargs {
        self.kwargs().clone()
    }

    /// Kwargs that only decide where the artifact is stored.
    ///
    /// They are left out of [`settings`](Self::settings), so moving the cache
    /// does not change any fingerprint.
    fn location_keys(&self) -> &[&str] {
        &[]
    }

    /// Name of this table's definition.
    fn name(&self) -> &'static str {
        self.definition().name()
    }

    /// The descriptor fingerprinted into cache filenames.
    fn settings(&self) -> Settings {
        let definition = self.definition();
        Settings::new(definition.name(), definition.type_path())
            .with_kwargs(self.kwargs().without(self.location_keys()))
            .with_post_processors(self.post_processors().iter().map(PostProcessor::name))
    }

    /// Builds `<base>_<fingerprint>.<ext>`, fingerprinting `settings` or,
    /// when `None`, [`settings`](Self::settings).
    fn cached_filename(
        &self,
        base: &str,
        ext: &str,
        settings: Option<&Settings>,
    ) -> Result<String, TableError> {
        let name = match settings {
            Some(settings) => tabs_cache::cached_filename(base, ext, settings)?,
            None => tabs_cache::cached_filename(base, ext, &self.settings())?,
        };
        debug!(table = self.name(), filename = %name, "fingerprinted cache filename");
        Ok(name)
    }

    /// Reads the cached dataset at `location`; `Ok(None)` if there is none.
    fn read_cache(&self, location: &Path) -> Result<Option<Frame>, CacheError> {
        match ArtifactStore::read_artifact(location)? {
            Some(payload) => ArtifactStore::decode(location, &payload).map(Some),
            None => Ok(None),
        }
    }

    /// Persists `data` at `location`.
    fn to_cache(&self, data: &Frame, location: &Path) -> Result<(), CacheError> {
        let payload = ArtifactStore::encode(data)?;
        ArtifactStore::write_artifact(location, &payload)
    }

    /// Returns this table's data, from the cache when possible.
    fn fetch(&self, options: FetchOptions) -> Result<Fetched, TableError> {
        crate::fetch::fetch(self, options)
    }

    /// Direct dependencies: the source's, then each post-processor's.
    fn dependencies(&self) -> Vec<Definition> {
        crate::deps::collect_dependencies(self)
    }

    /// Name and documentation of every post-processor.
    fn describe_processors(&self) -> Vec<ProcessorInfo> {
        self.post_processors().iter().map(PostProcessor::info).collect()
    }

    /// The description of this table as lines of text.
    fn description(&self, full: bool) -> Vec<String> {
        let definition = self.definition();
        describe_lines(
            definition.name(),
            definition.doc(),
            &self.describe_processors(),
            full,
        )
    }

    /// Writes the description to `out` and returns the written lines.
    fn describe_to(&self, out: &mut dyn Write, full: bool) -> io::Result<Vec<String>> {
        let lines = self.description(full);
        write_lines(out, &lines)?;
        Ok(lines)
    }

    /// Prints a description of this table to stdout and returns the lines.
    fn describe(&self, full: bool) -> Vec<String> {
        let lines = self.description(full);
        if let Err(e) = write_lines(&mut io::stdout().lock(), &lines) {
            warn!(table = self.name(), error = %e, "failed to print description");
        }
        lines
    }
}

/// Static identity of a table type.
///
/// Implementing this next to [`Table`] makes the type usable as a
/// dependency and registrable in a [`Catalog`](crate::Catalog).
pub trait TableDef: Table + Sized + 'static {
    /// The definition's name, used for lookup and descriptions.
    const NAME: &'static str;
    /// The definition's documentation.
    const DOC: &'static str;

    /// Binds the definition to a configuration.
    fn new(kwargs: Kwargs) -> Self;
}

/// Access to the [`Definition`] an instance was created from.
///
/// Implemented for every [`TableDef`].
pub trait Defined {
    /// The definition of this instance.
    fn definition(&self) -> Definition;
}

impl<T: TableDef> Defined for T {
    fn definition(&self) -> Definition {
        Definition::of::<T>()
    }
}

/// A handle to a table type: its name, documentation and constructor.
///
/// Definitions are what dependencies and registries refer to; instances are
/// created from them with [`instantiate`](Self::instantiate).
#[derive(Clone, Copy)]
pub struct Definition {
    name: &'static str,
    doc: &'static str,
    type_path: &'static str,
    construct: fn(Kwargs) -> Box<dyn Table>,
}

fn construct<T: TableDef>(kwargs: Kwargs) -> Box<dyn Table> {
    Box::new(T::new(kwargs))
}

impl Definition {
    /// The definition of table type `T`.
    pub fn of<T: TableDef>() -> Self {
        Self {
            name: T::NAME,
            doc: T::DOC,
            type_path: std::any::type_name::<T>(),
            construct: construct::<T>,
        }
    }

    /// The definition's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The definition's documentation.
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Fully qualified path of the implementing type.
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Module the implementing type is declared in.
    pub fn module_path(&self) -> &'static str {
        self.type_path
            .rsplit_once("::")
            .map(|(module, _)| module)
            .unwrap_or("")
    }

    /// Creates an instance bound to `kwargs`.
    pub fn instantiate(&self, kwargs: Kwargs) -> Box<dyn Table> {
        (self.construct)(kwargs)
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_path == other.type_path
    }
}

impl Eq for Definition {}

impl Hash for Definition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_path.hash(state);
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Definition({})", self.name)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
