//! # Document Loading
//!
//! Reads a configuration document from disk into a `serde_json::Value`.
//! Clash and Mihomo configurations are usually YAML, so `.yaml`/`.yml` files
//! are parsed as YAML and converted into the JSON data model; everything else
//! is parsed as JSON.

use std::path::Path;

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Failure to load a document from disk.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Path of the document.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// Path of the document.
        path: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The file is not valid YAML.
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        /// Path of the document.
        path: String,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML uses a construct with no JSON equivalent.
    #[error("cannot convert YAML in {path} to JSON: {reason}")]
    Conversion {
        /// Path of the document.
        path: String,
        /// What could not be converted.
        reason: String,
    },
}

/// True when the path's extension marks it as YAML.
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Load a JSON or YAML document, choosing the parser by file extension.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: display.clone(),
        source,
    })?;

    if is_yaml_path(path) {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|source| DocumentError::Yaml {
                path: display.clone(),
                source,
            })?;
        yaml_to_json_value(&yaml).map_err(|reason| DocumentError::Conversion {
            path: display,
            reason,
        })
    } else {
        serde_json::from_str(&content).map_err(|source| DocumentError::Json {
            path: display,
            source,
        })
    }
}

/// Convert a YAML value tree into the equivalent JSON value tree.
///
/// Tags are dropped. Scalar map keys (numbers, booleans) become strings;
/// compound or null keys are rejected. Non-finite floats are rejected.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("non-finite number {n}"))?
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .map(yaml_to_json_value)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported map key {other:?}")),
                };
                object.insert(key, yaml_to_json_value(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value)?,
    })
}
