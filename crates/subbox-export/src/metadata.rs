//! # Export Metadata
//!
//! Describes where a configuration came from and how many servers made it
//! through filtering. The checksum field starts empty and is stamped after
//! generation with [`Metadata::stamp_checksum`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use subbox_core::{config_checksum, CanonicalizationError};

/// Generator identifier written into metadata.
pub const GENERATOR_ID: &str = concat!("subbox-", env!("CARGO_PKG_VERSION"));

/// Server counts for one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCounts {
    /// Servers before filtering.
    pub total_servers: usize,
    /// Servers after filtering.
    pub filtered_servers: usize,
    /// `total_servers - filtered_servers`.
    pub excluded_servers: usize,
}

impl SubscriptionCounts {
    /// Counts from the pre-filter total and the number kept. `filtered`
    /// above `total` is clamped to `total`.
    pub fn new(total: usize, filtered: usize) -> Self {
        let filtered = filtered.min(total);
        Self {
            total_servers: total,
            filtered_servers: filtered,
            excluded_servers: total - filtered,
        }
    }
}

/// Metadata block of an export envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Subscription URL or file the servers came from.
    pub source: String,
    /// Generator identifier, e.g. `subbox-0.1.0`.
    pub generator: String,
    /// Lowercase hex SHA-256 of the canonical config. Empty until stamped.
    pub checksum: String,
    pub subscription_info: SubscriptionCounts,
}

impl Metadata {
    /// Compute and store the checksum of `config`.
    pub fn stamp_checksum(&mut self, config: &Value) -> Result<(), CanonicalizationError> {
        self.checksum = config_checksum(config)?;
        Ok(())
    }

    /// True if the stored checksum matches `config`.
    pub fn checksum_matches(&self, config: &Value) -> Result<bool, CanonicalizationError> {
        Ok(!self.checksum.is_empty() && config_checksum(config)? == self.checksum)
    }
}

/// Build unstamped metadata.
pub fn generate_metadata(source: &str, counts: SubscriptionCounts, generator: &str) -> Metadata {
    Metadata {
        source: source.to_string(),
        generator: generator.to_string(),
        checksum: String::new(),
        subscription_info: counts,
    }
}
