//! Configuration fingerprints and fingerprinted cache filenames.
//!
//! The fingerprint of a table instance is the XXH3-128 digest of the bincode
//! encoding of its [`Settings`]. `Kwargs` is an ordered map, so equal
//! configurations always encode to the same bytes regardless of how they
//! were built.

use std::collections::BTreeMap;

use serde::Serialize;
use tabs_common::{ContentHash, Kwargs};

use crate::artifact::ArtifactStore;
use crate::error::CacheError;

/// Version of the [`Settings`] layout. Bump when a field is added or
/// reinterpreted so that old artifacts stop matching.
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Canonical description of everything that determines a table's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Layout version of this descriptor.
    pub format_version: u32,
    /// Name of the table definition.
    pub table: String,
    /// Identifier of the source implementation.
    pub source: String,
    /// The instance configuration.
    pub kwargs: Kwargs,
    /// Post-processor identifiers in application order.
    pub post_processors: Vec<String>,
    /// Additional settings a table chooses to fold into its fingerprint.
    pub extra: BTreeMap<String, String>,
}

impl Settings {
    /// Creates a descriptor for the named table with an empty configuration.
    pub fn new(table: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            format_version: SETTINGS_FORMAT_VERSION,
            table: table.into(),
            source: source.into(),
            kwargs: Kwargs::new(),
            post_processors: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Sets the instance configuration.
    pub fn with_kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Sets the ordered post-processor identifiers.
    pub fn with_post_processors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post_processors = names.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an extra key/value pair to the descriptor.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the canonical byte encoding that is hashed.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CacheError> {
        ArtifactStore::encode(self)
    }

    /// Computes the fingerprint of this descriptor.
    pub fn fingerprint(&self) -> Result<ContentHash, CacheError> {
        Ok(ContentHash::from_bytes(&self.canonical_bytes()?))
    }
}

/// Builds `<base>_<fingerprint>.<ext>` for the given settings.
pub fn cached_filename(base: &str, ext: &str, settings: &Settings) -> Result<String, CacheError> {
    let digest = settings.fingerprint()?;
    Ok(format!("{base}_{digest}.{ext}"))
}
