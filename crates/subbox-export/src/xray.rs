//! # Xray Generator
//!
//! Builds an Xray configuration: a local SOCKS inbound, one outbound per
//! supported server, then `freedom` (tag `direct`) and `blackhole` (tag
//! `block`).

use serde_json::{json, Value};
use subbox_core::ParsedServer;

use crate::naming::NameAllocator;
use crate::options::ExportOptions;

/// Port of the local SOCKS inbound.
pub const SOCKS_PORT: u16 = 1080;

/// Generate an Xray configuration. Options have no Xray-specific fields.
pub fn generate(servers: &[ParsedServer], _options: &ExportOptions) -> Value {
    let mut names = NameAllocator::new();
    names.reserve("direct");
    names.reserve("block");

    let mut outbounds: Vec<Value> = servers
        .iter()
        .enumerate()
        .filter_map(|(index, server)| {
            let outbound = outbound(server, &mut names, index);
            if outbound.is_none() {
                tracing::warn!(
                    protocol = %server.protocol,
                    server = %server.name,
                    "unsupported protocol for xray; server skipped"
                );
            }
            outbound
        })
        .collect();
    outbounds.push(json!({"protocol": "freedom", "tag": "direct"}));
    outbounds.push(json!({"protocol": "blackhole", "tag": "block"}));

    json!({
        "log": {"loglevel": "warning"},
        "inbounds": [{
            "port": SOCKS_PORT,
            "protocol": "socks",
            "settings": {"auth": "noauth", "udp": true}
        }],
        "outbounds": outbounds,
        "routing": {"domainStrategy": "AsIs", "rules": []}
    })
}

fn outbound(server: &ParsedServer, names: &mut NameAllocator, index: usize) -> Option<Value> {
    let outbound = match server.protocol.as_str() {
        "vmess" => json!({
            "protocol": "vmess",
            "settings": {"vnext": [{
                "address": server.address,
                "port": server.port,
                "users": [{"id": server.uuid, "alterId": server.alter_id}]
            }]},
            "streamSettings": {
                "network": server.network_or_default(),
                "security": if server.tls { "tls" } else { "none" }
            }
        }),
        "ss" | "shadowsocks" => json!({
            "protocol": "shadowsocks",
            "settings": {"servers": [{
                "address": server.address,
                "port": server.port,
                "method": server.security,
                "password": server.password
            }]}
        }),
        "trojan" => json!({
            "protocol": "trojan",
            "settings": {"servers": [{
                "address": server.address,
                "port": server.port,
                "password": server.password
            }]},
            "streamSettings": {"security": "tls"}
        }),
        _ => return None,
    };

    let mut outbound = outbound;
    outbound["tag"] = json!(names.assign(index, &server.name));
    Some(outbound)
}
