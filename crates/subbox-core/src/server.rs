//! # Parsed Server Records
//!
//! `ParsedServer` is the normalized form of one proxy endpoint taken from a
//! subscription. Generators consume lists of these; they never see raw
//! subscription text.

use serde::{Deserialize, Serialize};

/// One proxy server as produced by subscription parsing.
///
/// Only `protocol`, `address` and `port` are required. Protocol-specific
/// credentials are optional and are read by the generators that need them
/// (`uuid` for vmess/vless, `password` for ss/trojan, `security` as the
/// shadowsocks cipher or vmess security).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedServer {
    /// Display name (the subscription's remark). May be empty.
    #[serde(default)]
    pub name: String,
    /// Protocol key: `vmess`, `vless`, `trojan`, `ss`, ...
    pub protocol: String,
    /// Hostname or IP address.
    pub address: String,
    /// Server port.
    pub port: u16,
    /// User id for vmess/vless.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Cipher (shadowsocks) or security mode (vmess).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    /// Password for shadowsocks/trojan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Transport network (`tcp`, `ws`, `grpc`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Whether the transport is wrapped in TLS.
    #[serde(default)]
    pub tls: bool,
    /// vmess alterId.
    #[serde(default)]
    pub alter_id: u32,
}

impl ParsedServer {
    /// Create a server record with only the required fields set.
    pub fn new(protocol: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: String::new(),
            protocol: protocol.into(),
            address: address.into(),
            port,
            uuid: None,
            security: None,
            password: None,
            network: None,
            tls: false,
            alter_id: 0,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the vmess/vless user id.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the cipher / security mode.
    pub fn with_security(mut self, security: impl Into<String>) -> Self {
        self.security = Some(security.into());
        self
    }

    /// Set the transport network.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Enable or disable TLS.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Transport network, defaulting to `tcp`.
    pub fn network_or_default(&self) -> &str {
        self.network.as_deref().unwrap_or("tcp")
    }
}
