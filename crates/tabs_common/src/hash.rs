//! 128-bit content digests for fingerprints and artifact checksums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit content hash computed using XXH3.
///
/// Used to fingerprint table configurations (the digest becomes part of the
/// cache artifact filename) and to checksum artifact payloads. The digest is
/// stable across process runs for identical input bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Parses the 32-character lowercase hex form produced by `Display`.
    ///
    /// Returns `None` for anything else, which is how fingerprinted
    /// filenames are told apart from unrelated files.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 32 || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return None;
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"TestTableOne");
        let b = ContentHash::from_bytes(b"TestTableOne");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"limit=1");
        let b = ContentHash::from_bytes(b"limit=2");
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_32_hex_chars() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h}");
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hex_form_parses_back() {
        let h = ContentHash::from_bytes(b"people.csv");
        assert_eq!(ContentHash::from_hex(&h.to_string()), Some(h));
    }

    #[test]
    fn from_hex_rejects_other_names() {
        assert_eq!(ContentHash::from_hex("people"), None);
        assert_eq!(ContentHash::from_hex(&"A".repeat(32)), None);
        assert_eq!(ContentHash::from_hex(&"g".repeat(32)), None);
        assert_eq!(ContentHash::from_hex(&"0".repeat(31)), None);
    }

    #[test]
    fn debug_abbreviated() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with(")"));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
