//! # Mihomo Generator
//!
//! Mihomo reads Clash configurations unchanged, so it gets the Clash output.

use serde_json::Value;
use subbox_core::ParsedServer;

use crate::clash;
use crate::options::ExportOptions;

/// Generate a Mihomo configuration.
pub fn generate(servers: &[ParsedServer], _options: &ExportOptions) -> Value {
    clash::generate_for("mihomo", servers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_clash_output() {
        let servers = vec![ParsedServer::new("ss", "example.com", 8388)
            .with_name("a")
            .with_security("aes-128-gcm")
            .with_password("pw")];
        let options = ExportOptions::default();
        assert_eq!(generate(&servers, &options), clash::generate(&servers, &options));
    }
}
