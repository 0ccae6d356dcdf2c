//! # subbox-cli: Command-Line Interface
//!
//! Provides the `subbox` binary.
//!
//! ## Subcommands
//!
//! - `subbox generate`: Build a client config from a servers file and wrap
//!   it in the export envelope.
//! - `subbox validate`: Schema and semantic validation of a config or
//!   envelope.
//! - `subbox checksum`: Canonical SHA-256 of a config; verifies envelopes.
//! - `subbox list-clients`: Supported clients and their protocols.
//! - `subbox info`: Generator id, clients and loaded schemas.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the `*Args` structs; handlers delegate to the
//!   library crates.
//! - Handlers return `anyhow::Result<u8>`: `Ok(0)` on success, `Ok(1)` when
//!   the input was checked and found wanting, `Err` for operational failures.

pub mod checksum;
pub mod clients;
pub mod generate;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use subbox_core::ParsedServer;

/// Directory name searched for when `--schema-dir` is not given.
pub const SCHEMA_DIR_NAME: &str = "schemas";

/// Walk up from `start` to the first directory containing `schemas/`.
pub fn find_schema_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(SCHEMA_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// The schema directory to use: the explicit one, else the nearest
/// `schemas/` above the current directory, else `./schemas`.
pub fn resolve_schema_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    std::env::current_dir()
        .ok()
        .and_then(|cwd| find_schema_dir(&cwd))
        .unwrap_or_else(|| PathBuf::from(SCHEMA_DIR_NAME))
}

/// Load a servers file: a JSON or YAML list of server records, or an object
/// with that list under `servers`.
pub fn load_servers(path: &Path) -> Result<Vec<ParsedServer>> {
    let document = subbox_schema::load_document(path)?;
    let list = match document {
        Value::Object(mut object) if object.contains_key("servers") => {
            object.remove("servers").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(list)
        .with_context(|| format!("{} is not a list of server records", path.display()))
}

/// Write `content` to `path`, creating parent directories.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_schema_dir_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("schemas")).unwrap();
        let nested = tmp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_schema_dir(&nested), Some(tmp.path().join("schemas")));
    }

    #[test]
    fn explicit_schema_dir_wins() {
        let dir = Path::new("/opt/subbox/schemas");
        assert_eq!(resolve_schema_dir(Some(dir)), dir.to_path_buf());
    }

    #[test]
    fn load_servers_accepts_list_and_wrapper() {
        let tmp = tempfile::tempdir().unwrap();
        let list = tmp.path().join("servers.json");
        std::fs::write(
            &list,
            r#"[{"name": "a", "protocol": "ss", "address": "x.example.com", "port": 8388}]"#,
        )
        .unwrap();
        let wrapped = tmp.path().join("servers.yaml");
        std::fs::write(
            &wrapped,
            "servers:\n  - protocol: vmess\n    address: y.example.com\n    port: 443\n    tls: true\n",
        )
        .unwrap();

        let servers = load_servers(&list).unwrap();
        assert_eq!(servers[0].name, "a");
        let servers = load_servers(&wrapped).unwrap();
        assert_eq!(servers[0].protocol, "vmess");
        assert!(servers[0].tls);
    }

    #[test]
    fn load_servers_rejects_bad_records() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("servers.json");
        std::fs::write(&path, r#"[{"protocol": "ss"}]"#).unwrap();
        let err = load_servers(&path).unwrap_err();
        assert!(err.to_string().contains("not a list of server records"));
    }

    #[test]
    fn write_output_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out/deep/config.json");
        write_output(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }
}
