//! # subbox CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use subbox_cli::checksum::{run_checksum, ChecksumArgs};
use subbox_cli::clients::{run_info, run_list_clients, ListClientsArgs};
use subbox_cli::generate::{run_generate, GenerateArgs};
use subbox_cli::resolve_schema_dir;
use subbox_cli::validate::{run_validate, ValidateArgs};

/// subbox: proxy client configuration generator and validator.
///
/// Converts parsed proxy servers into sing-box, Clash, Xray and Mihomo
/// configurations, stamps them with metadata and a checksum, and validates
/// configurations against JSON Schemas plus semantic rules.
#[derive(Parser, Debug)]
#[command(name = "subbox", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory containing `*.schema.json` files.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a client configuration from a servers file.
    Generate(GenerateArgs),

    /// Validate a configuration against its schema and semantic rules.
    Validate(ValidateArgs),

    /// Compute (and for envelopes, verify) the config checksum.
    Checksum(ChecksumArgs),

    /// List supported client types.
    ListClients(ListClientsArgs),

    /// Show generator and schema information.
    Info,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let schema_dir = resolve_schema_dir(cli.schema_dir.as_deref());
    tracing::debug!(schema_dir = %schema_dir.display(), "resolved schema directory");

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args, &schema_dir),
        Commands::Validate(args) => run_validate(&args, &schema_dir),
        Commands::Checksum(args) => run_checksum(&args),
        Commands::ListClients(args) => run_list_clients(&args),
        Commands::Info => run_info(&schema_dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
