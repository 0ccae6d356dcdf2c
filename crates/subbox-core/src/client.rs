//! # Client Types
//!
//! Defines the `ClientType` enum: the proxy-client configuration formats
//! subbox can generate and validate. This is the one definition used across
//! the workspace; generators, schema resolution, and semantic rules all key
//! off it (or off its string form).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SubboxError;

/// URI prefix of the canonical schema identifiers shipped with subbox.
pub const SCHEMA_ID_PREFIX: &str = "https://schemas.subbox.dev/";

/// A supported proxy-client configuration format.
///
/// | Variant  | Key        | Document shape                          |
/// |----------|------------|-----------------------------------------|
/// | SingBox  | `sing-box` | `inbounds` / `outbounds` / `route`      |
/// | Clash    | `clash`    | `proxies` / `proxy-groups` / `rules`    |
/// | Xray     | `xray`     | `inbounds` / `outbounds` / `routing`    |
/// | Mihomo   | `mihomo`   | Clash-compatible                        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClientType {
    /// sing-box universal proxy platform.
    #[serde(rename = "sing-box")]
    SingBox,
    /// Clash rule-based proxy.
    #[serde(rename = "clash")]
    Clash,
    /// Xray (V2Ray fork).
    #[serde(rename = "xray")]
    Xray,
    /// Mihomo (Clash Meta fork).
    #[serde(rename = "mihomo")]
    Mihomo,
}

impl ClientType {
    /// All supported clients in canonical order.
    pub const ALL: [ClientType; 4] = [Self::SingBox, Self::Clash, Self::Xray, Self::Mihomo];

    /// Returns the client key as used on the command line and in envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingBox => "sing-box",
            Self::Clash => "clash",
            Self::Xray => "xray",
            Self::Mihomo => "mihomo",
        }
    }

    /// Canonical schema identifier (`$id`) for this client's schema.
    pub fn schema_id(&self) -> String {
        format!("{SCHEMA_ID_PREFIX}{}.schema.json", self.as_str())
    }

    /// Conventional schema filename for this client (`sing_box.schema.json`).
    pub fn schema_filename(&self) -> String {
        schema_filename_for(self.as_str())
    }

    /// Human-readable product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SingBox => "Sing-box",
            Self::Clash => "Clash",
            Self::Xray => "Xray",
            Self::Mihomo => "Mihomo",
        }
    }

    /// Server protocols the generator for this client can emit.
    pub fn supported_protocols(&self) -> &'static [&'static str] {
        match self {
            Self::SingBox => &["vmess", "vless", "trojan", "ss"],
            Self::Clash | Self::Mihomo => &["vmess", "ss", "trojan"],
            Self::Xray => &["vmess", "trojan", "ss"],
        }
    }
}

/// Conventional schema filename for an arbitrary client key: hyphens become
/// underscores and `.schema.json` is appended.
pub fn schema_filename_for(client_key: &str) -> String {
    format!("{}.schema.json", client_key.replace('-', "_"))
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientType {
    type Err = SubboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| SubboxError::UnsupportedClient(s.to_string()))
    }
}
