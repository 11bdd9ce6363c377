//! CLI argument definitions using clap
//!
//! Commands:
//! - commander init [--config <path>]
//! - commander serve [--config <path>] [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Commander - store and look up command-line snippets over HTTP
#[derive(Parser, Debug)]
#[command(name = "commander")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CliCommand {
    /// Create the database and its schema
    Init {
        /// Path to configuration file (default: ./commander.json if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file (default: ./commander.json if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the configuration file
        #[arg(long)]
        port: Option<u16>,
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
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["commander", "serve", "--port", "8080"]).unwrap();
        assert_eq!(
            cli.command,
            CliCommand::Serve {
                config: None,
                port: Some(8080)
            }
        );
    }

    #[test]
    fn test_parse_init_with_config() {
        let cli = Cli::try_parse_from(["commander", "init", "--config", "c.json"]).unwrap();
        assert_eq!(
            cli.command,
            CliCommand::Init {
                config: Some(PathBuf::from("c.json"))
            }
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["commander"]).is_err());
    }
}
