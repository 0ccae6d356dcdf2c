//! # Export Envelope
//!
//! The document handed to the agent side:
//!
//! ```json
//! {
//!   "client": "sing-box",
//!   "version": "1.0.0",
//!   "created_at": "2026-01-15T12:00:00Z",
//!   "config": { ... },
//!   "metadata": { "source": ..., "generator": ..., "checksum": ..., "subscription_info": { ... } }
//! }
//! ```
//!
//! The checksum covers `config` only, so an envelope can be re-stamped with a
//! new `created_at` without invalidating it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use subbox_core::{CanonicalizationError, ClientType, ParsedServer, Timestamp};

use crate::error::ExportError;
use crate::filter::filter_servers;
use crate::metadata::{generate_metadata, Metadata, GENERATOR_ID};
use crate::options::ExportOptions;
use crate::registry::GeneratorRegistry;

/// Client version written when the caller does not pin one.
pub const DEFAULT_CLIENT_VERSION: &str = "1.0.0";

/// A generated configuration with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub client: ClientType,
    pub version: String,
    pub created_at: Timestamp,
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ExportEnvelope {
    /// Recompute the config checksum and compare it with the stored one.
    /// An envelope without metadata never verifies.
    pub fn verify_checksum(&self) -> Result<bool, CanonicalizationError> {
        match &self.metadata {
            Some(metadata) => metadata.checksum_matches(&self.config),
            None => Ok(false),
        }
    }

    /// Drop the metadata block.
    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }
}

/// True if `document` looks like an export envelope: an object with both
/// `client` and `config`.
pub fn is_envelope(document: &Value) -> bool {
    document.get("client").is_some() && document.get("config").is_some()
}

/// For an envelope, the inner config and the envelope's client string.
/// Otherwise the document itself and `None`.
pub fn split_envelope(document: &Value) -> (&Value, Option<&str>) {
    match (document.get("client"), document.get("config")) {
        (Some(client), Some(config)) => (config, client.as_str()),
        _ => (document, None),
    }
}

/// Runs filter → generate → metadata → checksum and builds the envelope.
#[derive(Debug, Clone)]
pub struct Exporter {
    registry: GeneratorRegistry,
    generator_id: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(GeneratorRegistry::default())
    }
}

impl Exporter {
    pub fn new(registry: GeneratorRegistry) -> Self {
        Self {
            registry,
            generator_id: GENERATOR_ID.to_string(),
        }
    }

    /// Override the generator identifier written into metadata.
    pub fn with_generator_id(mut self, generator_id: impl Into<String>) -> Self {
        self.generator_id = generator_id.into();
        self
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Export `servers` for `client`, stamped with the current time.
    pub fn export(
        &self,
        servers: &[ParsedServer],
        client: ClientType,
        source: &str,
        client_version: Option<&str>,
        options: &ExportOptions,
    ) -> Result<ExportEnvelope, ExportError> {
        self.export_at(servers, client, source, client_version, options, Timestamp::now())
    }

    /// Export with an explicit `created_at`.
    pub fn export_at(
        &self,
        servers: &[ParsedServer],
        client: ClientType,
        source: &str,
        client_version: Option<&str>,
        options: &ExportOptions,
        created_at: Timestamp,
    ) -> Result<ExportEnvelope, ExportError> {
        let filtered = filter_servers(servers, options);
        let config = self.registry.generate(client, &filtered.servers, options)?;

        let mut metadata = generate_metadata(source, filtered.counts(), &self.generator_id);
        metadata.stamp_checksum(&config)?;

        tracing::info!(
            %client,
            servers = filtered.kept(),
            checksum = %metadata.checksum,
            "exported configuration"
        );

        Ok(ExportEnvelope {
            client,
            version: client_version.unwrap_or(DEFAULT_CLIENT_VERSION).to_string(),
            created_at,
            config,
            metadata: Some(metadata),
        })
    }
}
