//! # sing-box Generator
//!
//! Builds a sing-box configuration: a local `mixed` inbound, one outbound
//! per supported server, then the fixed `direct` and `block` outbounds.
//! `inbounds`, `dns` and `route` from [`ExportOptions`] replace the
//! generated sections verbatim.

use serde_json::{json, Map, Value};
use subbox_core::ParsedServer;

use crate::naming::NameAllocator;
use crate::options::ExportOptions;

/// Listen address of the default inbound.
pub const DEFAULT_LISTEN: &str = "127.0.0.1";
/// Port of the default inbound.
pub const DEFAULT_LISTEN_PORT: u16 = 7890;

/// Generate a sing-box configuration.
pub fn generate(servers: &[ParsedServer], options: &ExportOptions) -> Value {
    let mut names = NameAllocator::new();
    names.reserve("direct");
    names.reserve("block");

    let mut outbounds: Vec<Value> = Vec::with_capacity(servers.len() + 2);
    for (index, server) in servers.iter().enumerate() {
        match outbound(server, &mut names, index) {
            Some(outbound) => outbounds.push(outbound),
            None => tracing::warn!(
                protocol = %server.protocol,
                server = %server.name,
                "unsupported protocol for sing-box; server skipped"
            ),
        }
    }
    let first_tag = outbounds
        .first()
        .and_then(|o| o.get("tag"))
        .and_then(Value::as_str)
        .unwrap_or("direct")
        .to_string();
    outbounds.push(json!({"type": "direct", "tag": "direct"}));
    outbounds.push(json!({"type": "block", "tag": "block"}));

    let mut config = Map::new();
    config.insert("log".into(), json!({"level": "info", "timestamp": true}));
    config.insert(
        "inbounds".into(),
        options.inbounds.clone().unwrap_or_else(|| {
            json!([{
                "type": "mixed",
                "tag": "mixed-in",
                "listen": DEFAULT_LISTEN,
                "listen_port": DEFAULT_LISTEN_PORT
            }])
        }),
    );
    config.insert("outbounds".into(), Value::Array(outbounds));
    if let Some(dns) = &options.dns {
        config.insert("dns".into(), dns.clone());
    }
    config.insert(
        "route".into(),
        options
            .route
            .clone()
            .unwrap_or_else(|| json!({"rules": [], "final": first_tag})),
    );
    Value::Object(config)
}

fn outbound(server: &ParsedServer, names: &mut NameAllocator, index: usize) -> Option<Value> {
    let kind = match server.protocol.as_str() {
        "vmess" => "vmess",
        "vless" => "vless",
        "trojan" => "trojan",
        "ss" | "shadowsocks" => "shadowsocks",
        _ => return None,
    };

    let mut out = Map::new();
    out.insert("type".into(), json!(kind));
    out.insert("tag".into(), json!(names.assign(index, &server.name)));
    out.insert("server".into(), json!(server.address));
    out.insert("server_port".into(), json!(server.port));

    match kind {
        "vmess" => {
            insert_some(&mut out, "uuid", server.uuid.as_deref());
            out.insert(
                "security".into(),
                json!(server.security.as_deref().unwrap_or("auto")),
            );
            out.insert("alter_id".into(), json!(server.alter_id));
        }
        "vless" => insert_some(&mut out, "uuid", server.uuid.as_deref()),
        "trojan" => insert_some(&mut out, "password", server.password.as_deref()),
        _ => {
            insert_some(&mut out, "method", server.security.as_deref());
            insert_some(&mut out, "password", server.password.as_deref());
        }
    }

    // Trojan is always TLS.
    if server.tls || kind == "trojan" {
        out.insert(
            "tls".into(),
            json!({"enabled": true, "server_name": server.address}),
        );
    }
    if kind != "shadowsocks" {
        let network = server.network_or_default();
        if network != "tcp" {
            out.insert("transport".into(), json!({"type": network}));
        }
    }

    Some(Value::Object(out))
}

fn insert_some(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.into(), json!(value));
    }
}
