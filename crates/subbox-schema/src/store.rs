//! # Schema Store
//!
//! Loads JSON Schema documents from a directory and resolves client types
//! to schemas.
//!
//! ## Loading
//!
//! [`SchemaStore::load`] scans the directory (non-recursively) for
//! `*.schema.json` files once, at construction. Each file is registered under
//! its declared `$id`, or under its file stem when no `$id` is present. A
//! file that cannot be read or parsed is logged and skipped; a missing
//! directory yields an empty store. Loading never fails.
//!
//! ## Resolution
//!
//! [`SchemaStore::resolve`] runs two explicit steps:
//!
//! 1. [`SchemaStore::lookup_by_identifier`]: map the client type to its
//!    canonical `$id` (`https://schemas.subbox.dev/<client>.schema.json`)
//!    and look that up in the loaded index.
//! 2. [`SchemaStore::load_fallback`]: read
//!    `<dir>/<client with '-' → '_'>.schema.json` from disk. This step
//!    bypasses the index on purpose, so a schema without the canonical `$id`
//!    can still serve its client.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use subbox_core::client::schema_filename_for;
use subbox_core::ClientType;

const SCHEMA_SUFFIX: &str = ".schema.json";

/// An immutable JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    id: String,
    source: PathBuf,
    body: Value,
}

impl SchemaDocument {
    /// Build a document from a parsed schema body. The identifier is the
    /// body's `$id` if it declares one, else `fallback_id`.
    pub fn new(body: Value, source: impl Into<PathBuf>, fallback_id: &str) -> Self {
        let id = body
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_id.to_string());
        Self {
            id,
            source: source.into(),
            body,
        }
    }

    /// Read and parse a schema file.
    fn read(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let body: Value = serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}"))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Ok(Self::new(body, path, stem))
    }

    /// The schema identifier (`$id` or file stem).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The file this schema was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The raw schema body.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// Read-only index of schemas loaded from one directory.
///
/// `SchemaStore` is `Send + Sync`; it is built once and shared by reference.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    schema_dir: PathBuf,
    schemas: HashMap<String, SchemaDocument>,
    /// Schema bodies by identifier, handed to the schema engine for `$ref`
    /// resolution. Built once at load.
    references: Arc<HashMap<String, Value>>,
}

impl SchemaStore {
    /// Load every `*.schema.json` file in `schema_dir`.
    pub fn load(schema_dir: impl Into<PathBuf>) -> Self {
        let schema_dir = schema_dir.into();
        let mut schemas = HashMap::new();

        let entries = match std::fs::read_dir(&schema_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    schema_dir = %schema_dir.display(),
                    "schemas directory not readable ({e}); no schemas loaded"
                );
                return Self::from_index(schema_dir, schemas);
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with(SCHEMA_SUFFIX))
            })
            .collect();
        paths.sort();

        for path in paths {
            match SchemaDocument::read(&path) {
                Ok(doc) => {
                    tracing::debug!(schema_id = doc.id(), "loaded schema");
                    schemas.insert(doc.id().to_string(), doc);
                }
                Err(reason) => {
                    tracing::error!(path = %path.display(), "failed to load schema: {reason}");
                }
            }
        }

        Self::from_index(schema_dir, schemas)
    }

    fn from_index(schema_dir: PathBuf, schemas: HashMap<String, SchemaDocument>) -> Self {
        let references = schemas
            .iter()
            .map(|(id, doc)| (id.clone(), doc.body().clone()))
            .collect();
        Self {
            schema_dir,
            schemas,
            references: Arc::new(references),
        }
    }

    /// The directory schemas were loaded from.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Number of loaded schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when no schema was loaded.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Identifiers of all loaded schemas, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Look up a loaded schema by identifier.
    pub fn get(&self, schema_id: &str) -> Option<&SchemaDocument> {
        self.schemas.get(schema_id)
    }

    /// Loaded schema bodies by identifier, for `$ref` resolution. Shared,
    /// not copied.
    pub(crate) fn reference_index(&self) -> Arc<HashMap<String, Value>> {
        Arc::clone(&self.references)
    }

    /// Canonical schema identifier for a client type, if it is a known client.
    pub fn canonical_identifier(client_type: &str) -> Option<String> {
        client_type
            .parse::<ClientType>()
            .ok()
            .map(|client| client.schema_id())
    }

    /// Resolution step 1: canonical identifier table, then the loaded index.
    pub fn lookup_by_identifier(&self, client_type: &str) -> Option<&SchemaDocument> {
        let schema_id = Self::canonical_identifier(client_type)?;
        self.schemas.get(&schema_id)
    }

    /// Resolution step 2: read `<client>.schema.json` from the schema
    /// directory. Missing, unreadable or unparsable files yield `None`.
    pub fn load_fallback(&self, client_type: &str) -> Option<SchemaDocument> {
        if client_type.is_empty()
            || client_type.starts_with('.')
            || client_type.contains(['/', '\\'])
        {
            return None;
        }

        let path = self.schema_dir.join(schema_filename_for(client_type));
        if !path.is_file() {
            return None;
        }

        match SchemaDocument::read(&path) {
            Ok(doc) => Some(doc),
            Err(reason) => {
                tracing::error!(path = %path.display(), "failed to load schema: {reason}");
                None
            }
        }
    }

    /// Resolve the schema for a client type: step 1, then step 2.
    pub fn resolve(&self, client_type: &str) -> Option<Cow<'_, SchemaDocument>> {
        if let Some(doc) = self.lookup_by_identifier(client_type) {
            return Some(Cow::Borrowed(doc));
        }
        self.load_fallback(client_type).map(Cow::Owned)
    }
}
