//! # Semantic Rules
//!
//! Checks that JSON Schema cannot express: numeric ranges with domain
//! meaning and referential integrity between named sections.
//!
//! Rules are plain functions held in a registry keyed by client-type string.
//! Adding a client is a [`SemanticRuleSet::register`] call. Unknown client
//! types have no rules and produce no findings; flagging an unknown client is
//! the schema resolution step's job.
//!
//! Every rule tolerates documents that failed structural validation: fields
//! with the wrong shape are skipped or reported, never assumed.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

/// A semantic rule: inspects a document and returns violations in document
/// order. An empty vector means no findings.
pub type RuleFn = fn(&Value) -> Vec<String>;

/// Registry of semantic rules keyed by client type.
#[derive(Clone)]
pub struct SemanticRuleSet {
    rules: HashMap<String, RuleFn>,
}

impl std::fmt::Debug for SemanticRuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticRuleSet")
            .field("client_types", &self.client_types())
            .finish()
    }
}

impl Default for SemanticRuleSet {
    /// The built-in rules for `sing-box`, `clash`, `xray` and `mihomo`.
    fn default() -> Self {
        let mut set = Self::empty();
        set.register("sing-box", singbox_rules);
        set.register("clash", clash_rules);
        set.register("xray", xray_rules);
        set.register("mihomo", mihomo_rules);
        set
    }
}

impl SemanticRuleSet {
    /// A registry with no rules.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register (or replace) the rule for a client type.
    pub fn register(&mut self, client_type: impl Into<String>, rule: RuleFn) -> &mut Self {
        self.rules.insert(client_type.into(), rule);
        self
    }

    /// True if a rule is registered for `client_type`.
    pub fn contains(&self, client_type: &str) -> bool {
        self.rules.contains_key(client_type)
    }

    /// Client types with a registered rule, sorted.
    pub fn client_types(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Run the rule registered for `client_type` against `document`.
    pub fn check(&self, client_type: &str, document: &Value) -> Vec<String> {
        self.rules
            .get(client_type)
            .map(|rule| rule(document))
            .unwrap_or_default()
    }
}

/// sing-box: at least one outbound; inbound `listen_port` within 1..=65535.
pub fn singbox_rules(config: &Value) -> Vec<String> {
    outbound_and_port_rules("sing-box", "listen_port", config)
}

/// Xray: at least one outbound; inbound `port` within 1..=65535.
pub fn xray_rules(config: &Value) -> Vec<String> {
    outbound_and_port_rules("xray", "port", config)
}

/// Clash: at least one proxy; proxy-group members must name a defined proxy.
pub fn clash_rules(config: &Value) -> Vec<String> {
    proxy_reference_rules("clash", config)
}

/// Mihomo: identical to the Clash rule.
pub fn mihomo_rules(config: &Value) -> Vec<String> {
    proxy_reference_rules("mihomo", config)
}

fn is_non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

/// Any JSON number in 1..=65535 passes, integral floats such as `443.0`
/// included. Strings and booleans never do.
fn is_valid_port(value: &Value) -> bool {
    value
        .as_f64()
        .is_some_and(|port| (1.0..=65535.0).contains(&port))
}

fn outbound_and_port_rules(client: &str, port_field: &str, config: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if !is_non_empty_array(config.get("outbounds")) {
        errors.push(format!("{client} configuration must have at least one outbound"));
    }

    if let Some(inbounds) = config.get("inbounds").and_then(Value::as_array) {
        for (index, inbound) in inbounds.iter().enumerate() {
            if let Some(port) = inbound.get(port_field) {
                if !is_valid_port(port) {
                    errors.push(format!("Invalid port {port} in inbound {index}"));
                }
            }
        }
    }

    errors
}

/// Render a name-like value: strings bare, anything else as JSON.
fn display_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn proxy_reference_rules(client: &str, config: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let proxies = config.get("proxies");

    if !is_non_empty_array(proxies) {
        errors.push(format!("{client} configuration must have at least one proxy"));
    }

    let Some(groups) = config.get("proxy-groups").and_then(Value::as_array) else {
        return errors;
    };

    let defined: HashSet<&str> = proxies
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|proxy| proxy.get("name").and_then(Value::as_str))
        .collect();

    for group in groups {
        let group_name = group.get("name").map(display_name).unwrap_or_default();
        let members = group.get("proxies").and_then(Value::as_array);
        for member in members.into_iter().flatten() {
            let known = member.as_str().is_some_and(|name| defined.contains(name));
            if !known {
                errors.push(format!(
                    "Proxy group '{group_name}' references undefined proxy '{}'",
                    display_name(member)
                ));
            }
        }
    }

    errors
}
