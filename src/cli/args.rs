//! CLI argument definitions using clap
//!
//! Commands:
//! - annostore serve --config <path> [--port <port>]
//! - annostore compile --config <path>
//! - annostore check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// annostore - Web Annotation search service
#[derive(Parser, Debug)]
#[command(name = "annostore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./annostore.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compile a query read from stdin and print its pipeline
    Compile {
        /// Path to configuration file
        #[arg(long, default_value = "./annostore.json")]
        config: PathBuf,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./annostore.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_with_port() {
        let cli = Cli::try_parse_from(["annostore", "serve", "--config", "a.json", "--port", "9000"])
            .unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("a.json"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_check_config_default_path() {
        let cli = Cli::try_parse_from(["annostore", "check-config"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::CheckConfig { config } if config == PathBuf::from("./annostore.json")
        ));
    }
}
