//! # Generate Subcommand
//!
//! Reads a servers file, applies exclusion/inclusion, generates the client
//! config and prints (or writes) the export envelope.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use subbox_core::ClientType;
use subbox_export::{parse_name_list, ExportEnvelope, ExportOptions, Exporter};
use subbox_schema::{ConfigValidator, SchemaStore};

/// Arguments for the `subbox generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JSON or YAML file with the parsed server list.
    #[arg(long, short = 's', value_name = "FILE")]
    pub servers: PathBuf,

    /// Target client type (sing-box, clash, xray, mihomo).
    #[arg(long, short = 'c', default_value = "sing-box")]
    pub client: ClientType,

    /// Source recorded in metadata. Defaults to the servers file path.
    #[arg(long)]
    pub source: Option<String>,

    /// Output file. Prints to stdout when omitted.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Client version recorded in the envelope.
    #[arg(long)]
    pub client_version: Option<String>,

    /// Comma-separated server names to exclude.
    #[arg(long)]
    pub exclude: Option<String>,

    /// Comma-separated server names to keep (all others are dropped).
    #[arg(long)]
    pub include: Option<String>,

    /// YAML or JSON file with export options.
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,

    /// Omit the metadata block.
    #[arg(long)]
    pub no_metadata: bool,

    /// Validate the generated config before emitting it.
    #[arg(long)]
    pub validate: bool,
}

/// Execute the generate subcommand.
///
/// Returns exit code: 0 on success, 1 if `--validate` rejects the config.
pub fn run_generate(args: &GenerateArgs, schema_dir: &Path) -> Result<u8> {
    let servers = crate::load_servers(&args.servers)?;
    tracing::info!(count = servers.len(), "loaded servers");

    let options = build_options(args)?;
    let source = args
        .source
        .clone()
        .unwrap_or_else(|| args.servers.display().to_string());

    let envelope = Exporter::default()
        .export(
            &servers,
            args.client,
            &source,
            args.client_version.as_deref(),
            &options,
        )
        .context("failed to generate configuration")?;

    if args.validate {
        let store = SchemaStore::load(schema_dir);
        let result = ConfigValidator::new(&store).validate(&envelope.config, args.client.as_str());
        if !result.is_valid() {
            for error in result.errors() {
                tracing::error!(client = %args.client, "generated configuration is invalid: {error}");
            }
            return Ok(1);
        }
    }

    let rendered = render(envelope, args)?;
    match &args.output {
        Some(path) => {
            crate::write_output(path, &rendered)?;
            println!("Configuration written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(0)
}

/// Options file (if any) with `--exclude`/`--include` merged in.
fn build_options(args: &GenerateArgs) -> Result<ExportOptions> {
    let mut options = match &args.options {
        Some(path) => ExportOptions::from_path(path)?,
        None => ExportOptions::default(),
    };
    if let Some(raw) = &args.exclude {
        options = options.exclude(parse_name_list(raw));
    }
    if let Some(raw) = &args.include {
        options = options.include(parse_name_list(raw));
    }
    Ok(options)
}

fn render(envelope: ExportEnvelope, args: &GenerateArgs) -> Result<String> {
    let envelope = if args.no_metadata {
        envelope.without_metadata()
    } else {
        envelope
    };
    let rendered = if args.compact {
        serde_json::to_string(&envelope)?
    } else {
        serde_json::to_string_pretty(&envelope)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(servers: PathBuf, output: PathBuf) -> GenerateArgs {
        GenerateArgs {
            servers,
            client: ClientType::Clash,
            source: None,
            output: Some(output),
            client_version: None,
            exclude: None,
            include: None,
            options: None,
            compact: true,
            no_metadata: false,
            validate: false,
        }
    }

    fn servers_file(dir: &Path) -> PathBuf {
        let path = dir.join("servers.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "a", "protocol": "ss", "address": "a.example.com", "port": 8388,
                 "security": "aes-256-gcm", "password": "x"},
                {"name": "b", "protocol": "trojan", "address": "b.example.com", "port": 443,
                 "password": "y"}
            ]"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn writes_envelope_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("clash.json");
        let code = run_generate(&args(servers_file(tmp.path()), out.clone()), tmp.path()).unwrap();
        assert_eq!(code, 0);

        let envelope: ExportEnvelope =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(envelope.client, ClientType::Clash);
        assert!(envelope.verify_checksum().unwrap());
        let metadata = envelope.metadata.unwrap();
        assert!(metadata.source.ends_with("servers.json"));
    }

    #[test]
    fn exclude_flag_and_no_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("clash.json");
        let mut a = args(servers_file(tmp.path()), out.clone());
        a.exclude = Some("a".into());
        a.no_metadata = true;
        run_generate(&a, tmp.path()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert!(value.get("metadata").is_none());
        assert_eq!(value["config"]["proxies"].as_array().unwrap().len(), 1);
        assert_eq!(value["config"]["proxies"][0]["name"], "b");
    }

    #[test]
    fn validate_flag_rejects_empty_clash_config() {
        let tmp = tempfile::tempdir().unwrap();
        let schemas = tmp.path().join("schemas");
        std::fs::create_dir_all(&schemas).unwrap();
        std::fs::write(schemas.join("clash.schema.json"), r#"{"type": "object"}"#).unwrap();

        let out = tmp.path().join("clash.json");
        let mut a = args(servers_file(tmp.path()), out.clone());
        a.include = Some("nobody".into());
        a.validate = true;
        assert_eq!(run_generate(&a, &schemas).unwrap(), 1);
        assert!(!out.exists());
    }

    #[test]
    fn options_file_is_merged() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = tmp.path().join("options.yaml");
        std::fs::write(&opts, "exclude_servers: [a]\n").unwrap();
        let mut a = args(servers_file(tmp.path()), tmp.path().join("o.json"));
        a.options = Some(opts);
        a.exclude = Some("b, a".into());
        let options = build_options(&a).unwrap();
        assert_eq!(options.exclude_servers, vec!["a", "b"]);
    }
}
