//! Cache artifact storage and configuration fingerprinting.
//!
//! A table's computed dataset is persisted as a single artifact file whose
//! name embeds a fingerprint of the table's settings. This crate provides the
//! fingerprint generator and the validated on-disk artifact format.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod fingerprint;

pub use artifact::{ArtifactHeader, ArtifactStore};
pub use error::CacheError;
pub use fingerprint::{cached_filename, Settings, SETTINGS_FORMAT_VERSION};
