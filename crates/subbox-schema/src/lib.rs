//! # subbox-schema: Configuration Validation
//!
//! Validates generated (or hand-written) client configurations in two
//! layers: structural validation against a JSON Schema (Draft 2020-12), then
//! semantic rules that a schema cannot express.
//!
//! ## Components
//!
//! - [`SchemaStore`]: loads every `*.schema.json` in a directory once and
//!   resolves a client type to a schema: first through the canonical
//!   identifier table, then through the `<client>.schema.json` filename
//!   convention read from disk.
//! - [`SemanticRuleSet`]: registry of per-client rule functions (port
//!   ranges, required sections, dangling proxy-group references).
//! - [`ConfigValidator`]: parses input, resolves the schema, runs both
//!   layers and merges everything into one [`ValidationResult`].
//!
//! ## Crate Policy
//!
//! - Depends only on `subbox-core` internally.
//! - [`ConfigValidator::validate`] never panics and never returns an error:
//!   the [`ValidationResult`] is the only channel for findings.
//! - No network access. Cross-schema `$ref`s resolve only against schemas
//!   loaded into the store.

pub mod document;
pub mod rules;
pub mod store;
pub mod validate;

pub use document::{is_yaml_path, load_document, yaml_to_json_value, DocumentError};
pub use rules::{RuleFn, SemanticRuleSet};
pub use store::{SchemaDocument, SchemaStore};
pub use validate::{ConfigInput, ConfigValidator, ValidationResult};
