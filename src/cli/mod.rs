//! CLI module
//!
//! Command-line interface for running paginated operations.
//!
//! # Commands
//!
//! - `list` - List built-in operations
//! - `show` - Print an operation definition
//! - `run` - Page through an operation and print its items

mod commands;
mod runner;

pub use commands::{parse_filter, Cli, Commands, OutputFormat};
pub use runner::Runner;
