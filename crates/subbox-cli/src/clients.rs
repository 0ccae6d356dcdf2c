//! # Client Listing and Info Subcommands
//!
//! `subbox list-clients` describes every supported client; `subbox info`
//! summarizes the generator and the schema store it would validate with.

use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use subbox_core::ClientType;
use subbox_export::{GeneratorRegistry, GENERATOR_ID};
use subbox_schema::{SchemaStore, SemanticRuleSet};

/// Output format for `list-clients`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Arguments for the `subbox list-clients` subcommand.
#[derive(Args, Debug)]
pub struct ListClientsArgs {
    /// Output format.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

/// Description of one supported client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientInfo {
    #[serde(rename = "type")]
    pub client_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub supported_protocols: &'static [&'static str],
    pub schema_id: String,
}

impl ClientInfo {
    pub fn new(client: ClientType) -> Self {
        Self {
            client_type: client.as_str(),
            name: client.display_name(),
            description: description(client),
            supported_protocols: client.supported_protocols(),
            schema_id: client.schema_id(),
        }
    }
}

fn description(client: ClientType) -> &'static str {
    match client {
        ClientType::SingBox => "Universal proxy platform",
        ClientType::Clash => "Rule-based proxy in Go",
        ClientType::Xray => "Platform for building proxies",
        ClientType::Mihomo => "Clash fork with enhanced features",
    }
}

/// Info for every client with a registered generator.
pub fn client_infos(registry: &GeneratorRegistry) -> Vec<ClientInfo> {
    registry.clients().into_iter().map(ClientInfo::new).collect()
}

/// Execute the list-clients subcommand.
pub fn run_list_clients(args: &ListClientsArgs) -> Result<u8> {
    let infos = client_infos(&GeneratorRegistry::default());
    match args.output {
        OutputFormat::Json => {
            let body = serde_json::json!({ "clients": infos });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table => {
            println!("Supported client types:");
            println!("{}", "=".repeat(60));
            for info in &infos {
                println!("Type:        {}", info.client_type);
                println!("Name:        {}", info.name);
                println!("Description: {}", info.description);
                println!("Protocols:   {}", info.supported_protocols.join(", "));
                println!("Schema:      {}", info.schema_id);
                println!("{}", "-".repeat(40));
            }
        }
    }
    Ok(0)
}

/// Execute the info subcommand.
pub fn run_info(schema_dir: &Path) -> Result<u8> {
    let store = SchemaStore::load(schema_dir);
    let rules = SemanticRuleSet::default();
    let clients: Vec<&str> = ClientType::ALL.iter().map(ClientType::as_str).collect();

    println!("Generator:         {GENERATOR_ID}");
    println!("Supported clients: {}", clients.join(", "));
    println!("Semantic rules:    {}", rules.client_types().join(", "));
    println!("Schema directory:  {}", store.schema_dir().display());
    println!("Loaded schemas:    {}", store.len());
    for id in store.identifiers() {
        println!("  - {id}");
    }
    for client in ClientType::ALL {
        if store.resolve(client.as_str()).is_none() {
            println!("  WARN: no schema for {client}");
        }
    }
    Ok(0)
}
