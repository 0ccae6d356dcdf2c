//! # Checksum Subcommand
//!
//! Prints the canonical SHA-256 of a configuration. For an export envelope
//! the checksum covers the inner `config`, and the stored
//! `metadata.checksum` is compared against it.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use subbox_core::config_checksum;
use subbox_export::{is_envelope, split_envelope};
use subbox_schema::load_document;

/// Arguments for the `subbox checksum` subcommand.
#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Configuration or envelope file.
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: PathBuf,
}

/// Outcome of checking one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumReport {
    /// Checksum of the (inner) config.
    pub computed: String,
    /// `metadata.checksum` of an envelope, if present.
    pub stored: Option<String>,
}

impl ChecksumReport {
    /// False only when a stored checksum exists and differs.
    pub fn is_consistent(&self) -> bool {
        self.stored.as_ref().map_or(true, |stored| *stored == self.computed)
    }
}

/// Compute the checksum report for a file.
pub fn checksum_file(path: &Path) -> Result<ChecksumReport> {
    let document = load_document(path)?;
    let (config, _) = split_envelope(&document);
    let stored = if is_envelope(&document) {
        document
            .pointer("/metadata/checksum")
            .and_then(Value::as_str)
            .map(str::to_string)
    } else {
        None
    };
    Ok(ChecksumReport {
        computed: config_checksum(config)?,
        stored,
    })
}

/// Execute the checksum subcommand.
///
/// Returns exit code: 0 on success, 1 if an envelope's stored checksum
/// does not match its config.
pub fn run_checksum(args: &ChecksumArgs) -> Result<u8> {
    let report = checksum_file(&args.file)?;
    println!("{}", report.computed);

    match &report.stored {
        Some(_) if report.is_consistent() => {
            println!("stored checksum matches");
            Ok(0)
        }
        Some(stored) => {
            println!("MISMATCH: stored checksum is {stored}");
            Ok(1)
        }
        None => Ok(0),
    }
}
