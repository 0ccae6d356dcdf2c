//! # Clash Generator
//!
//! Builds a Clash configuration: fixed listener and controller settings,
//! one proxy per supported server, a `Proxy` select group over all proxies
//! and a short rule list routing through that group.

use serde_json::{json, Map, Value};
use subbox_core::ParsedServer;

use crate::naming::NameAllocator;
use crate::options::ExportOptions;

/// Name of the select group every proxy is placed in.
pub const PROXY_GROUP: &str = "Proxy";

/// Names a proxy may not take: the select group and Clash's built-in targets
/// share the proxy namespace.
pub const RESERVED_NAMES: [&str; 3] = [PROXY_GROUP, "DIRECT", "REJECT"];

/// Rules emitted into every config.
pub const DEFAULT_RULES: [&str; 3] = [
    "DOMAIN-SUFFIX,google.com,Proxy",
    "GEOIP,CN,DIRECT",
    "MATCH,Proxy",
];

/// Generate a Clash configuration. Options have no Clash-specific fields.
pub fn generate(servers: &[ParsedServer], _options: &ExportOptions) -> Value {
    generate_for("clash", servers)
}

/// Shared body of the Clash and Mihomo generators; `client` only labels logs.
pub(crate) fn generate_for(client: &str, servers: &[ParsedServer]) -> Value {
    let mut names = NameAllocator::new();
    for reserved in RESERVED_NAMES {
        names.reserve(reserved);
    }
    let mut proxies = Vec::with_capacity(servers.len());
    for (index, server) in servers.iter().enumerate() {
        match proxy(server, &mut names, index) {
            Some(proxy) => proxies.push(proxy),
            None => tracing::warn!(
                client,
                protocol = %server.protocol,
                server = %server.name,
                "unsupported protocol; server skipped"
            ),
        }
    }

    let mut groups = Vec::new();
    if !proxies.is_empty() {
        let members: Vec<Value> = proxies.iter().map(|p| p["name"].clone()).collect();
        groups.push(json!({"name": PROXY_GROUP, "type": "select", "proxies": members}));
    }

    json!({
        "port": 7890,
        "socks-port": 7891,
        "mode": "rule",
        "log-level": "info",
        "external-controller": "127.0.0.1:9090",
        "proxies": proxies,
        "proxy-groups": groups,
        "rules": DEFAULT_RULES,
    })
}

fn proxy(server: &ParsedServer, names: &mut NameAllocator, index: usize) -> Option<Value> {
    let kind = match server.protocol.as_str() {
        "vmess" => "vmess",
        "ss" | "shadowsocks" => "ss",
        "trojan" => "trojan",
        _ => return None,
    };

    let mut out = Map::new();
    out.insert("name".into(), json!(names.assign(index, &server.name)));
    out.insert("type".into(), json!(kind));
    out.insert("server".into(), json!(server.address));
    out.insert("port".into(), json!(server.port));

    match kind {
        "vmess" => {
            if let Some(uuid) = &server.uuid {
                out.insert("uuid".into(), json!(uuid));
            }
            out.insert("alterId".into(), json!(server.alter_id));
            out.insert("cipher".into(), json!("auto"));
            out.insert("tls".into(), json!(server.tls));
            out.insert("network".into(), json!(server.network_or_default()));
        }
        "ss" => {
            if let Some(cipher) = &server.security {
                out.insert("cipher".into(), json!(cipher));
            }
            if let Some(password) = &server.password {
                out.insert("password".into(), json!(password));
            }
        }
        _ => {
            if let Some(password) = &server.password {
                out.insert("password".into(), json!(password));
            }
            out.insert("tls".into(), json!(true));
        }
    }

    Some(Value::Object(out))
}
