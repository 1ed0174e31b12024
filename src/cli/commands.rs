//! CLI commands and argument parsing

use crate::types::JsonValue;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated queries against Neptune and IVS RealTime list/describe APIs
#[derive(Parser, Debug)]
#[command(name = "paged-query")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Region (overrides config and environment)
    #[arg(short, long, global = true)]
    pub region: Option<String>,

    /// Endpoint URL (overrides config and environment)
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List built-in operations
    List,

    /// Show an operation definition
    Show {
        /// Built-in operation name or YAML file (`path#name` to select one)
        operation: String,
    },

    /// Run a paginated operation and print its items
    Run {
        /// Built-in operation name or YAML file (`path#name` to select one)
        operation: String,

        /// Request filter (repeatable); values are parsed as JSON when possible
        #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, JsonValue)>,

        /// Maximum items to return across all pages
        #[arg(long)]
        max_items: Option<usize>,

        /// Items per request (clamped to the service maximum)
        #[arg(long)]
        page_size: Option<usize>,

        /// Token to resume from; fetches a single page
        #[arg(long)]
        starting_token: Option<String>,

        /// Fetch a single page and print the next token
        #[arg(long)]
        no_auto_iterate: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `KEY=VALUE` filter
///
/// `VALUE` is taken as JSON if it parses (`5`, `true`, `["a"]`), otherwise
/// as a plain string.
pub fn parse_filter(raw: &str) -> std::result::Result<(String, JsonValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid filter '{raw}': expected KEY=VALUE"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid filter '{raw}': empty key"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::from(value));
    Ok((key.to_string(), value))
}
