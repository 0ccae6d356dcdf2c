//! # subbox-export: Client Config Generation
//!
//! Turns a list of [`ParsedServer`](subbox_core::ParsedServer) records into a
//! client configuration and wraps it in the export envelope consumed by the
//! agent side:
//!
//! ```text
//! servers ──filter──► kept servers ──generator──► config
//!                                                   │
//!       metadata (source, counts) ◄── checksum ◄────┘
//!                    │
//!                    ▼
//!   { client, version, created_at, config, metadata }
//! ```
//!
//! - **Filtering** (`filter.rs`): exclusion then inclusion by server name.
//! - **Generators** (`singbox.rs`, `clash.rs`, `xray.rs`, `mihomo.rs`): pure
//!   functions `(servers, options) -> config`, registered per client in
//!   [`GeneratorRegistry`].
//! - **Metadata** (`metadata.rs`): source, generator id, server counts and
//!   the config checksum.
//! - **Envelope** (`envelope.rs`): [`Exporter`] runs the pipeline and builds
//!   an [`ExportEnvelope`].
//!
//! ## Crate Policy
//!
//! - Depends only on `subbox-core` internally. Validation of generated output
//!   is the caller's decision (see `subbox-schema`).
//! - Generators never fail. A server whose protocol the client cannot express
//!   is skipped with a warning.

pub mod clash;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod mihomo;
pub mod naming;
pub mod options;
pub mod registry;
pub mod singbox;
pub mod xray;

pub use envelope::{is_envelope, split_envelope, ExportEnvelope, Exporter, DEFAULT_CLIENT_VERSION};
pub use error::ExportError;
pub use filter::{filter_servers, FilterOutcome};
pub use metadata::{generate_metadata, Metadata, SubscriptionCounts, GENERATOR_ID};
pub use options::{parse_name_list, ExportOptions};
pub use registry::{GeneratorFn, GeneratorRegistry};
