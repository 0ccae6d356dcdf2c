//! # Validate Subcommand
//!
//! Validates a configuration file (JSON or YAML) against the schema and
//! semantic rules for its client type. An export envelope is unwrapped: its
//! inner `config` is validated and its `client` becomes the default client.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use subbox_export::split_envelope;
use subbox_schema::{is_yaml_path, load_document, ConfigValidator, SchemaStore, ValidationResult};

/// Client assumed when neither `--client` nor an envelope names one.
pub const DEFAULT_CLIENT: &str = "sing-box";

/// Arguments for the `subbox validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration or envelope file to validate.
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: PathBuf,

    /// Client type. Defaults to the envelope's client, else sing-box.
    #[arg(long, short = 'c')]
    pub client: Option<String>,

    /// Print the validation result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if valid, 1 if invalid.
pub fn run_validate(args: &ValidateArgs, schema_dir: &Path) -> Result<u8> {
    let store = SchemaStore::load(schema_dir);
    tracing::info!(
        schema_dir = %schema_dir.display(),
        schema_count = store.len(),
        "loaded schema store"
    );

    let result = validate_file(&ConfigValidator::new(&store), &args.file, args.client.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&args.file, &result);
    }

    Ok(if result.is_valid() { 0 } else { 1 })
}

/// Validate one file. JSON that does not parse is still reported through the
/// validator so the output format is the same for every failure.
pub fn validate_file(
    validator: &ConfigValidator<'_>,
    path: &Path,
    client: Option<&str>,
) -> Result<ValidationResult> {
    if is_yaml_path(path) {
        let document = load_document(path)?;
        return Ok(validate_document(validator, &document, client));
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(document) => Ok(validate_document(validator, &document, client)),
        Err(_) => Ok(validator.validate(text.as_str(), client.unwrap_or(DEFAULT_CLIENT))),
    }
}

fn validate_document(
    validator: &ConfigValidator<'_>,
    document: &serde_json::Value,
    client: Option<&str>,
) -> ValidationResult {
    let (config, envelope_client) = split_envelope(document);
    let client = client.or(envelope_client).unwrap_or(DEFAULT_CLIENT);
    validator.validate(config, client)
}

fn print_report(path: &Path, result: &ValidationResult) {
    if result.is_valid() {
        println!("PASS: {} ({})", path.display(), result.client_type());
        for warning in result.warnings() {
            println!("  WARN: {warning}");
        }
    } else {
        println!("FAIL: {} ({})", path.display(), result.client_type());
        for error in result.errors() {
            println!("  - {error}");
        }
    }
}
