//! # Export Options
//!
//! Optional knobs for generation, loadable from a YAML or JSON file:
//!
//! ```yaml
//! exclude_servers: [slow-node]
//! include_servers: []
//! inbounds:
//!   - { type: tun, tag: tun-in, inet4_address: 172.19.0.1/30 }
//! route:
//!   final: direct
//! ```
//!
//! `inbounds`, `dns` and `route` replace the corresponding sing-box
//! sections verbatim; other generators ignore them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExportError;

/// Generation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Replacement sing-box `inbounds` section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbounds: Option<Value>,
    /// Replacement sing-box `dns` section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<Value>,
    /// Replacement sing-box `route` section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Value>,
    /// Server names to drop.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_servers: Vec<String>,
    /// When non-empty, only these server names are kept.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_servers: Vec<String>,
}

impl ExportOptions {
    /// Load options from a YAML or JSON file.
    ///
    /// JSON is a subset of YAML, so one parser covers both.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let options_error = |reason: String| ExportError::Options {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| options_error(e.to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| options_error(e.to_string()))
    }

    /// Add names to the exclusion list, skipping duplicates.
    pub fn exclude(mut self, names: impl IntoIterator<Item = String>) -> Self {
        extend_unique(&mut self.exclude_servers, names);
        self
    }

    /// Add names to the inclusion list, skipping duplicates.
    pub fn include(mut self, names: impl IntoIterator<Item = String>) -> Self {
        extend_unique(&mut self.include_servers, names);
        self
    }
}

fn extend_unique(list: &mut Vec<String>, names: impl IntoIterator<Item = String>) {
    for name in names {
        if !list.contains(&name) {
            list.push(name);
        }
    }
}

/// Split a comma-separated name list, trimming whitespace and dropping
/// empty entries.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
