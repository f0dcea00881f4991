//! CLI module for annostore
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP server
//! - compile: Show the pipeline compiled from a query
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_config, compile, compile_pipeline, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_json};
