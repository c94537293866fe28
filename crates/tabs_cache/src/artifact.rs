//! Validated on-disk artifact files.
//!
//! Every artifact is laid out as a 4-byte little-endian header length, a
//! bincode-encoded [`ArtifactHeader`], then the payload bytes. The header
//! carries magic bytes, a format version and a checksum of the payload so that
//! a truncated or foreign file is reported instead of being decoded as data.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tabs_common::ContentHash;
use tracing::debug;

use crate::error::CacheError;

/// Magic bytes identifying a tabs cache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"TABS";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload format.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every cached artifact for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"TABS"`.
    pub magic: [u8; 4],

    /// Artifact format version.
    pub format_version: u32,

    /// Version of the crate that produced this artifact.
    pub tabs_version: String,

    /// Content hash of the payload data.
    pub checksum: ContentHash,
}

/// Reads and writes artifact files at caller-chosen locations.
///
/// The location of an artifact is owned by the table that produces it, so
/// the store itself is stateless.
pub struct ArtifactStore;

impl ArtifactStore {
    /// Serializes a value into payload bytes.
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CacheError> {
        bincode::serde::encode_to_vec(value, bincode::config::standard()).map_err(|e| {
            CacheError::Serialization {
                reason: e.to_string(),
            }
        })
    }

    /// Deserializes payload bytes read from `path`.
    pub fn decode<T: DeserializeOwned>(path: &Path, payload: &[u8]) -> Result<T, CacheError> {
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map(|(value, _)| value)
            .map_err(|e| CacheError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Writes an artifact to `path`, creating parent directories.
    ///
    /// The bytes are written to a sibling `.tmp` file first and renamed into
    /// place, so readers never observe a half-written artifact under `path`.
    pub fn write_artifact(path: &Path, data: &[u8]) -> Result<(), CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            tabs_version: env!("CARGO_PKG_VERSION").to_string(),
            checksum: ContentHash::from_bytes(data),
        };
        let header_bytes = Self::encode(&header)?;

        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        let tmp = temp_path(path);
        std::fs::write(&tmp, &output).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            CacheError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        debug!(path = %path.display(), bytes = data.len(), "wrote artifact");
        Ok(())
    }

    /// Reads and validates the artifact at `path`.
    ///
    /// Returns `Ok(None)` when no file exists there. Any other failure,
    /// including a corrupt header or a checksum mismatch, is an error.
    pub fn read_artifact(path: &Path) -> Result<Option<Vec<u8>>, CacheError> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let invalid = |reason: &str| CacheError::InvalidHeader {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if raw.len() < 4 {
            return Err(invalid("file too short for header length"));
        }
        let header_len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        if raw.len() < 4 + header_len {
            return Err(invalid("truncated header"));
        }

        let (header, _): (ArtifactHeader, usize) =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .map_err(|e| invalid(&e.to_string()))?;

        if header.magic != ARTIFACT_MAGIC {
            return Err(invalid("missing magic bytes"));
        }

        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path: path.to_path_buf(),
                expected: ARTIFACT_FORMAT_VERSION,
                actual: header.format_version,
            });
        }

        let payload = &raw[4 + header_len..];
        let actual = ContentHash::from_bytes(payload);
        if actual != header.checksum {
            return Err(CacheError::ChecksumMismatch {
                path: path.to_path_buf(),
                expected: header.checksum.to_string(),
                actual: actual.to_string(),
            });
        }

        Ok(Some(payload.to_vec()))
    }

    /// Removes artifacts named `<base>_<digest>.<ext>` in `dir`, except `keep`.
    ///
    /// Used to clear out artifacts left behind by earlier configurations of a
    /// table. Returns the number of files removed.
    pub fn prune(dir: &Path, base: &str, ext: &str, keep: &Path) -> Result<usize, CacheError> {
        if !dir.exists() {
            return Ok(0);
        }

        let prefix = format!("{base}_");
        let mut removed = 0;
        let entries = std::fs::read_dir(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path == keep || path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(digest) = stem.strip_prefix(&prefix) else {
                continue;
            };
            if ContentHash::from_hex(digest).is_some() {
                std::fs::remove_file(&path).map_err(|e| CacheError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
