//! # Content Digest: Config Checksums
//!
//! Defines `ContentDigest` and `DigestAlgorithm`, and the checksum helpers
//! used when stamping export metadata.
//!
//! ## Invariant
//!
//! `ContentDigest` can only be computed from `CanonicalBytes`, so every
//! checksum in the system is produced through the canonical serialization
//! pipeline. This is enforced by the signature of `sha256_digest()`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256: the only algorithm export metadata uses.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    ///
    /// Prefer [`sha256_digest()`] for constructing digests from
    /// `CanonicalBytes`.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Checksum of a client configuration document: the lowercase hex SHA-256
/// of its canonical serialization (64 characters).
///
/// Key order in `config` is irrelevant; any change to a value changes the
/// checksum.
pub fn config_checksum(config: &impl Serialize) -> Result<String, CanonicalizationError> {
    let canonical = CanonicalBytes::new(config)?;
    Ok(sha256_hex(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_sha256_digest_deterministic() {
        let mut data = BTreeMap::new();
        data.insert("a", 1);
        data.insert("b", 2);
        let cb = CanonicalBytes::new(&data).unwrap();
        let d1 = sha256_digest(&cb);
        let d2 = sha256_digest(&cb);
        assert_eq!(d1, d2);
        assert_eq!(d1.algorithm, DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_sha256_hex_format() {
        let cb = CanonicalBytes::new(&serde_json::json!({"key": "value"})).unwrap();
        let hex = sha256_hex(&cb);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_content_digest_display() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let s = format!("{}", sha256_digest(&cb));
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn test_known_sha256_vector() {
        // hashlib.sha256(b"{}").hexdigest()
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_hex(&cb),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_config_checksum_ignores_key_order() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"mode":"rule","port":7890,"proxies":[]}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"proxies":[],"port":7890,"mode":"rule"}"#).unwrap();
        assert_eq!(config_checksum(&a).unwrap(), config_checksum(&b).unwrap());
    }

    #[test]
    fn test_config_checksum_changes_with_values() {
        let a = serde_json::json!({"port": 7890});
        let b = serde_json::json!({"port": 7891});
        assert_ne!(config_checksum(&a).unwrap(), config_checksum(&b).unwrap());
    }
}
