//! # Configuration Validator
//!
//! [`ConfigValidator::validate`] runs one validation pass:
//!
//! 1. Parse text input as JSON. A parse failure short-circuits with a single
//!    `Invalid JSON: ...` error.
//! 2. Resolve the schema through [`SchemaStore::resolve`]. No schema
//!    short-circuits with `No schema found for client type: ...`.
//! 3. Structural validation against the schema (Draft 2020-12). Every
//!    violation is collected as `Validation error: ...`; a schema that does
//!    not compile yields `Schema error: ...`; a panic inside the schema
//!    engine is caught and reported as `Unexpected error: ...`.
//! 4. Semantic rules for the client type, appended after structural errors
//!    regardless of the outcome of step 3.
//!
//! Nothing is returned as `Err` and nothing panics out of this call.

use std::borrow::Cow;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use jsonschema::{Retrieve, Uri, Validator};
use serde::Serialize;
use serde_json::Value;

use crate::rules::SemanticRuleSet;
use crate::store::{SchemaDocument, SchemaStore};

/// Resolves `$ref` URIs against the schemas already loaded in the store.
///
/// The schema engine never reaches the network: a reference that is not in
/// the store fails schema compilation instead.
struct StoreRetriever {
    schemas_by_uri: Arc<HashMap<String, Value>>,
}

impl StoreRetriever {
    fn from_store(store: &SchemaStore) -> Self {
        Self {
            schemas_by_uri: store.reference_index(),
        }
    }
}

impl Retrieve for StoreRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        if let Some(value) = self.schemas_by_uri.get(uri) {
            return Ok(value.clone());
        }

        // Relative references are resolved to full URIs before they reach
        // the retriever; retry with the final path segment as a file stem.
        let filename = uri.rsplit('/').next().unwrap_or(uri);
        let stem = filename.strip_suffix(".json").unwrap_or(filename);
        self.schemas_by_uri
            .get(stem)
            .cloned()
            .ok_or_else(|| format!("referenced schema is not loaded: {uri}").into())
    }
}

/// A configuration to validate: raw text, or an already-parsed document.
#[derive(Debug, Clone, Copy)]
pub enum ConfigInput<'a> {
    /// JSON text, parsed before validation.
    Text(&'a str),
    /// A parsed JSON value.
    Document(&'a Value),
}

impl<'a> From<&'a str> for ConfigInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for ConfigInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a Value> for ConfigInput<'a> {
    fn from(document: &'a Value) -> Self {
        Self::Document(document)
    }
}

/// Outcome of one validation pass.
///
/// `errors` holds structural errors first, then semantic errors.
/// `warnings` is reserved for non-fatal findings and is currently always
/// empty. `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    client_type: String,
    #[serde(skip)]
    structural_count: usize,
}

impl ValidationResult {
    fn new(client_type: &str, structural: Vec<String>, semantic: Vec<String>) -> Self {
        let structural_count = structural.len();
        let mut errors = structural;
        errors.extend(semantic);
        Self {
            valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
            client_type: client_type.to_string(),
            structural_count,
        }
    }

    /// A failed result carrying a single structural error.
    fn failed(client_type: &str, error: String) -> Self {
        Self::new(client_type, vec![error], Vec::new())
    }

    /// True when no error of any kind was found.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// All errors: structural, then semantic.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Errors from parsing, schema resolution and schema validation.
    pub fn structural_errors(&self) -> &[String] {
        &self.errors[..self.structural_count]
    }

    /// Errors from the semantic rules.
    pub fn semantic_errors(&self) -> &[String] {
        &self.errors[self.structural_count..]
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The client type this result was produced for.
    pub fn client_type(&self) -> &str {
        &self.client_type
    }
}

/// Compiled validators for schemas from the store's index, by identifier.
/// Fallback schemas are read from disk on every call and never cached.
#[derive(Clone, Default)]
struct CompiledSchemas(Arc<Mutex<HashMap<String, Arc<Validator>>>>);

impl CompiledSchemas {
    fn get(&self, schema_id: &str) -> Option<Arc<Validator>> {
        self.0.lock().ok()?.get(schema_id).cloned()
    }

    fn insert(&self, schema_id: &str, validator: Arc<Validator>) {
        if let Ok(mut cache) = self.0.lock() {
            cache.insert(schema_id.to_string(), validator);
        }
    }

    fn len(&self) -> usize {
        self.0.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for CompiledSchemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchemas")
            .field("count", &self.len())
            .finish()
    }
}

/// Validates configurations against a [`SchemaStore`] and a
/// [`SemanticRuleSet`].
///
/// Each indexed schema is compiled on first use and reused afterwards;
/// clones share that cache. One validator can serve any number of calls.
#[derive(Debug, Clone)]
pub struct ConfigValidator<'s> {
    store: &'s SchemaStore,
    rules: SemanticRuleSet,
    compiled: CompiledSchemas,
}

impl<'s> ConfigValidator<'s> {
    /// A validator using the built-in semantic rules.
    pub fn new(store: &'s SchemaStore) -> Self {
        Self::with_rules(store, SemanticRuleSet::default())
    }

    /// A validator using a custom rule registry.
    pub fn with_rules(store: &'s SchemaStore, rules: SemanticRuleSet) -> Self {
        Self {
            store,
            rules,
            compiled: CompiledSchemas::default(),
        }
    }

    pub fn store(&self) -> &SchemaStore {
        self.store
    }

    pub fn rules(&self) -> &SemanticRuleSet {
        &self.rules
    }

    /// Validate a configuration for `client_type`.
    pub fn validate<'i>(
        &self,
        input: impl Into<ConfigInput<'i>>,
        client_type: &str,
    ) -> ValidationResult {
        let document: Cow<'i, Value> = match input.into() {
            ConfigInput::Document(value) => Cow::Borrowed(value),
            ConfigInput::Text(text) => match serde_json::from_str(text) {
                Ok(value) => Cow::Owned(value),
                Err(e) => {
                    tracing::warn!(client_type, "configuration is not valid JSON: {e}");
                    return ValidationResult::failed(client_type, format!("Invalid JSON: {e}"));
                }
            },
        };

        let Some(schema) = self.store.resolve(client_type) else {
            tracing::warn!(client_type, "no schema found");
            return ValidationResult::failed(
                client_type,
                format!("No schema found for client type: {client_type}"),
            );
        };
        tracing::debug!(client_type, schema_id = schema.id(), "validating configuration");

        let cacheable = matches!(schema, Cow::Borrowed(_));
        let structural = catch_engine_panic(schema.id(), || {
            self.structural_errors(&schema, cacheable, &document)
        });
        let semantic = self.rules.check(client_type, &document);
        let result = ValidationResult::new(client_type, structural, semantic);

        if result.is_valid() {
            tracing::debug!(client_type, "configuration is valid");
        } else {
            tracing::warn!(
                client_type,
                error_count = result.errors().len(),
                "configuration failed validation"
            );
        }
        result
    }

    /// Compiled validator for `schema`, from the cache when `cacheable`.
    fn compile(&self, schema: &SchemaDocument, cacheable: bool) -> Result<Arc<Validator>, String> {
        if cacheable {
            if let Some(validator) = self.compiled.get(schema.id()) {
                return Ok(validator);
            }
        }

        let mut options = jsonschema::options();
        options.with_draft(jsonschema::Draft::Draft202012);
        options.with_retriever(StoreRetriever::from_store(self.store));
        let validator = Arc::new(options.build(schema.body()).map_err(|e| e.to_string())?);
        tracing::debug!(schema_id = schema.id(), cacheable, "compiled schema");

        if cacheable {
            self.compiled.insert(schema.id(), Arc::clone(&validator));
        }
        Ok(validator)
    }

    fn structural_errors(
        &self,
        schema: &SchemaDocument,
        cacheable: bool,
        document: &Value,
    ) -> Vec<String> {
        let validator = match self.compile(schema, cacheable) {
            Ok(validator) => validator,
            Err(e) => {
                tracing::error!(schema_id = schema.id(), "schema does not compile: {e}");
                return vec![format!("Schema error: {e}")];
            }
        };

        validator
            .iter_errors(document)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    format!("Validation error: {error}")
                } else {
                    format!("Validation error at {path}: {error}")
                }
            })
            .collect()
    }
}

/// Run a structural check so a panic in the schema engine becomes a single
/// `Unexpected error:` entry.
fn catch_engine_panic(schema_id: &str, check: impl FnOnce() -> Vec<String>) -> Vec<String> {
    match panic::catch_unwind(AssertUnwindSafe(check)) {
        Ok(errors) => errors,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "schema engine panicked".to_string());
            tracing::error!(schema_id, "structural validation panicked: {reason}");
            vec![format!("Unexpected error: {reason}")]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, SchemaStore) {
        let tmp = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(tmp.path().join(name), content).unwrap();
        }
        let store = SchemaStore::load(tmp.path());
        (tmp, store)
    }

    const OBJECT_SCHEMA: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://schemas.subbox.dev/sing-box.schema.json",
        "type": "object",
        "properties": {"outbounds": {"type": "array"}}
    }"#;

    #[test]
    fn invalid_json_short_circuits() {
        let (_tmp, store) = store_with(&[("sing_box.schema.json", OBJECT_SCHEMA)]);
        let result = ConfigValidator::new(&store).validate("{ not json", "sing-box");
        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].starts_with("Invalid JSON: "));
        assert!(result.semantic_errors().is_empty());
    }

    #[test]
    fn missing_schema_short_circuits() {
        let (_tmp, store) = store_with(&[]);
        let result = ConfigValidator::new(&store).validate(&json!({}), "sing-box");
        assert_eq!(
            result.errors(),
            ["No schema found for client type: sing-box".to_string()]
        );
        assert!(result.semantic_errors().is_empty());
    }

    #[test]
    fn structural_and_semantic_errors_are_both_reported() {
        let (_tmp, store) = store_with(&[("sing_box.schema.json", OBJECT_SCHEMA)]);
        let result = ConfigValidator::new(&store).validate(&json!({"outbounds": "nope"}), "sing-box");
        assert!(!result.is_valid());
        assert_eq!(result.structural_errors().len(), 1);
        assert!(result.structural_errors()[0].starts_with("Validation error at /outbounds: "));
        assert_eq!(
            result.semantic_errors(),
            ["sing-box configuration must have at least one outbound".to_string()]
        );
    }

    #[test]
    fn root_violation_has_no_path() {
        let (_tmp, store) = store_with(&[("sing_box.schema.json", OBJECT_SCHEMA)]);
        let result = ConfigValidator::new(&store).validate("[]", "sing-box");
        assert!(result.errors()[0].starts_with("Validation error: "));
    }

    #[test]
    fn broken_schema_reports_schema_error() {
        let (_tmp, store) = store_with(&[(
            "clash.schema.json",
            r#"{"$id": "https://schemas.subbox.dev/clash.schema.json", "type": 42}"#,
        )]);
        let result = ConfigValidator::new(&store).validate(
            &json!({"proxies": [{"name": "a"}]}),
            "clash",
        );
        assert!(!result.is_valid());
        assert!(result.errors()[0].starts_with("Schema error: "), "{:?}", result.errors());
    }

    #[test]
    fn ref_to_another_loaded_schema_resolves() {
        let (_tmp, store) = store_with(&[
            (
                "port.schema.json",
                r#"{"$id": "https://schemas.subbox.dev/port.schema.json", "type": "integer"}"#,
            ),
            (
                "xray.schema.json",
                r#"{
                    "$id": "https://schemas.subbox.dev/xray.schema.json",
                    "type": "object",
                    "properties": {
                        "inbounds": {"type": "array", "items": {
                            "type": "object",
                            "properties": {"port": {"$ref": "port.schema.json"}}
                        }}
                    }
                }"#,
            ),
        ]);
        let validator = ConfigValidator::new(&store);
        let ok = json!({"outbounds": [{"protocol": "freedom"}], "inbounds": [{"port": 1080}]});
        assert!(validator.validate(&ok, "xray").is_valid());

        let bad = json!({"outbounds": [{"protocol": "freedom"}], "inbounds": [{"port": "x"}]});
        let result = validator.validate(&bad, "xray");
        assert!(result.structural_errors().iter().any(|e| e.contains("/inbounds/0/port")));
    }

    #[test]
    fn unresolvable_ref_is_schema_error_not_network() {
        let (_tmp, store) = store_with(&[(
            "mihomo.schema.json",
            r#"{"$id": "https://schemas.subbox.dev/mihomo.schema.json",
                "$ref": "https://example.invalid/missing.schema.json"}"#,
        )]);
        let result = ConfigValidator::new(&store).validate(&json!({"proxies": [{}]}), "mihomo");
        assert!(result.errors()[0].starts_with("Schema error: "), "{:?}", result.errors());
    }

    #[test]
    fn custom_rules_replace_builtin() {
        fn no_rules(_: &Value) -> Vec<String> {
            Vec::new()
        }
        let (_tmp, store) = store_with(&[("sing_box.schema.json", OBJECT_SCHEMA)]);
        let mut rules = SemanticRuleSet::default();
        rules.register("sing-box", no_rules);
        let result = ConfigValidator::with_rules(&store, rules).validate(&json!({}), "sing-box");
        assert!(result.is_valid());
    }

    #[test]
    fn result_serializes_four_fields() {
        let (_tmp, store) = store_with(&[]);
        let result = ConfigValidator::new(&store).validate("{}", "surge");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "valid": false,
                "errors": ["No schema found for client type: surge"],
                "warnings": [],
                "client_type": "surge"
            })
        );
    }

    #[test]
    fn string_input_accepted() {
        let (_tmp, store) = store_with(&[("sing_box.schema.json", OBJECT_SCHEMA)]);
        let text = String::from(r#"{"outbounds": [{"tag": "direct"}]}"#);
        let result = ConfigValidator::new(&store).validate(&text, "sing-box");
        assert!(result.is_valid(), "{:?}", result.errors());
        assert!(result.warnings().is_empty());
        assert_eq!(result.client_type(), "sing-box");
    }

    #[test]
    fn engine_panic_becomes_unexpected_error() {
        let errors = catch_engine_panic("https://schemas.subbox.dev/clash.schema.json", || {
            panic!("index out of bounds")
        });
        assert_eq!(errors, vec!["Unexpected error: index out of bounds".to_string()]);

        let detail = String::from("bad pointer");
        let errors = catch_engine_panic("clash", || panic!("{detail}"));
        assert_eq!(errors, vec!["Unexpected error: bad pointer".to_string()]);

        let errors = catch_engine_panic("clash", || std::panic::panic_any(7u8));
        assert_eq!(errors, vec!["Unexpected error: schema engine panicked".to_string()]);
    }

    #[test]
    fn completed_check_passes_through() {
        let errors = catch_engine_panic("clash", || vec!["Validation error: x".to_string()]);
        assert_eq!(errors, vec!["Validation error: x".to_string()]);
    }

    #[test]
    fn indexed_schema_compiled_once_and_reused() {
        let (_tmp, store) = store_with(&[("sing_box.schema.json", OBJECT_SCHEMA)]);
        let validator = ConfigValidator::new(&store);
        assert_eq!(validator.compiled.len(), 0);

        let ok = json!({"outbounds": [{"tag": "direct"}]});
        assert!(validator.validate(&ok, "sing-box").is_valid());
        assert_eq!(validator.compiled.len(), 1);

        let bad = json!({"outbounds": "nope"});
        assert!(!validator.validate(&bad, "sing-box").is_valid());
        assert!(validator.validate(&ok, "sing-box").is_valid());
        assert_eq!(validator.compiled.len(), 1);

        let clone = validator.clone();
        assert!(clone.validate(&ok, "sing-box").is_valid());
        assert_eq!(validator.compiled.len(), 1);
    }

    #[test]
    fn fallback_schema_is_not_cached() {
        let (tmp, store) = store_with(&[(
            "xray.schema.json",
            r#"{"$id": "urn:custom:xray", "type": "object", "required": ["outbounds"]}"#,
        )]);
        let validator = ConfigValidator::new(&store);
        let result = validator.validate(&json!({}), "xray");
        assert!(result.structural_errors()[0].starts_with("Validation error: "));
        assert_eq!(validator.compiled.len(), 0);

        // The fallback file is re-read, so an edit on disk takes effect.
        std::fs::write(tmp.path().join("xray.schema.json"), r#"{"type": "object"}"#).unwrap();
        assert!(validator.validate(&json!({}), "xray").structural_errors().is_empty());
    }

    #[test]
    fn validator_reports_store_dir() {
        let (tmp, store) = store_with(&[]);
        let validator = ConfigValidator::new(&store);
        assert_eq!(validator.store().schema_dir(), Path::new(tmp.path()));
        assert!(validator.rules().contains("clash"));
    }
}
