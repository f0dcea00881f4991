//! CLI command implementations
//!
//! `serve` wires the store, the search and index services and the HTTP
//! server; the other commands are one-shot and never start a runtime.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::http_server::{spawn_session_sweeper, AppState, HttpServer};
use crate::query::{FilterCompiler, QueryAssembler, QueryExpression};
use crate::store::MemoryStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Compile { config } => compile(&config),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Start the HTTP server
///
/// Boot order:
/// 1. Load and validate configuration
/// 2. Seed the in-memory store
/// 3. Wire services and start the session sweeper
/// 4. Serve until the listener fails
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    if let Some(dir) = &config.seed_dir {
        let loaded = store
            .seed_from_dir(dir)
            .map_err(|e| CliError::boot_failed(format!("Failed to seed store: {}", e)))?;
        info!(annotations = loaded, dir = %dir.display(), "store seeded");
    }

    let state = Arc::new(AppState::new(&config, store));
    let server = HttpServer::new(config.http.clone(), Arc::clone(&state));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let _sweeper =
            spawn_session_sweeper(Arc::clone(state.cache()), config.search.eviction_interval());
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Compile a query to its pipeline JSON using the configured compiler
/// settings
pub fn compile_pipeline(config: &Config, query: Value) -> CliResult<Value> {
    let expression = QueryExpression::from_json(query)?;
    let assembler = QueryAssembler::new(FilterCompiler::new(config.range_selector_type.clone()));
    let stages = assembler.compile_query(&expression)?;
    Ok(Value::Array(stages.iter().map(|s| s.to_json()).collect()))
}

/// Read one query from stdin and print the compiled pipeline
pub fn compile(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let query = read_request()?;
    let pipeline = compile_pipeline(&config, query)?;
    write_json(&pipeline, config.pretty_print)
}

/// Print the effective configuration
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    write_json(&config, true)
}
