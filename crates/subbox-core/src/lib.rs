//! # subbox-core: Foundational Types for subbox
//!
//! This crate is the leaf of the subbox workspace. It defines the types every
//! other crate speaks: the supported proxy clients, the parsed-server record
//! that generators consume, and the canonical serialization that config
//! checksums are computed over.
//!
//! ## Key Design Principles
//!
//! 1. **`ClientType` enum.** One definition of the supported client formats
//!    (`sing-box`, `clash`, `xray`, `mihomo`). Adding a client forces every
//!    exhaustive `match` to handle it.
//!
//! 2. **`CanonicalBytes` newtype.** ALL checksum computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for checksums.
//!    The byte layout is the one produced by
//!    `json.dumps(doc, sort_keys=True, separators=(",", ":"))`, so checksums
//!    stay reproducible across implementations.
//!
//! 3. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every checksum path goes through canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `subbox-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod client;
pub mod digest;
pub mod error;
pub mod server;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use client::ClientType;
pub use digest::{config_checksum, sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, SubboxError};
pub use server::ParsedServer;
pub use temporal::Timestamp;
