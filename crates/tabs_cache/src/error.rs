//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while reading, writing or naming cache artifacts.
///
/// A missing artifact is not an error: reads report absence as `Ok(None)`.
/// Every variant here means the artifact exists but could not be used, or
/// that persisting it failed.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact file has an invalid or missing header.
    #[error("invalid artifact header in {path}: {reason}")]
    InvalidHeader {
        /// The artifact file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored checksum does not match the computed checksum of the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The artifact file path.
        path: PathBuf,
        /// The expected checksum from the header.
        expected: String,
        /// The actual checksum computed from the payload.
        actual: String,
    },

    /// The artifact format version does not match the current version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The artifact file path.
        path: PathBuf,
        /// The expected format version.
        expected: u32,
        /// The actual format version found in the file.
        actual: u32,
    },

    /// The artifact payload could not be decoded into a dataset.
    #[error("failed to decode artifact {path}: {reason}")]
    Decode {
        /// The artifact file path.
        path: PathBuf,
        /// Description of the decoding failure.
        reason: String,
    },

    /// A value could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/cache/people_abc.tab"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("people_abc.tab"));
    }

    #[test]
    fn invalid_header_display() {
        let err = CacheError::InvalidHeader {
            path: PathBuf::from("bad.tab"),
            reason: "missing magic bytes".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid artifact header"));
        assert!(msg.contains("missing magic bytes"));
    }

    #[test]
    fn checksum_mismatch_display() {
        let err = CacheError::ChecksumMismatch {
            path: PathBuf::from("file.tab"),
            expected: "aabb".to_string(),
            actual: "ccdd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("checksum mismatch"));
        assert!(msg.contains("aabb"));
        assert!(msg.contains("ccdd"));
    }

    #[test]
    fn version_mismatch_display() {
        let err = CacheError::VersionMismatch {
            path: PathBuf::from("old.tab"),
            expected: 2,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("got 1"));
    }

    #[test]
    fn decode_display() {
        let err = CacheError::Decode {
            path: PathBuf::from("x.tab"),
            reason: "unexpected end".to_string(),
        };
        assert_eq!(err.to_string(), "failed to decode artifact x.tab: unexpected end");
    }
}
