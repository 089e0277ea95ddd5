//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "bikehero")]
#[command(about = "BikeHero support assistant: pricing index, chat API and tools")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: level from config)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database schema
    Init {
        /// Drop existing tables first (all chat history is lost)
        #[arg(long)]
        reset: bool,
    },
    /// Start the HTTP API server
    Serve {
        /// Host address (default from config)
        #[arg(long)]
        host: Option<String>,
        /// Port (default from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS
        #[arg(long)]
        no_cors: bool,
    },
    /// Rebuild the pricing index
    Index {
        /// Catalog file, JSON or TOML (default: configured catalog, else built-in)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Ask the assistant one question
    Ask {
        /// The message to send
        message: String,
        /// Also record the exchange in chat history
        #[arg(long)]
        save: bool,
    },
    /// Show stored chat history, newest first
    History {
        /// Maximum number of exchanges to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
    /// Show current configuration
    Config,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_index_with_catalog() {
        let cli = Cli::parse_from(["bikehero", "index", "--catalog", "pricing.toml"]);
        match cli.command {
            Commands::Index { catalog } => {
                assert_eq!(catalog, Some(PathBuf::from("pricing.toml")));
            }
            _ => panic!("expected index command"),
        }
    }

    #[test]
    fn test_parse_ask_and_history() {
        let cli = Cli::parse_from(["bikehero", "-v", "ask", "How much is Premium?"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Ask { ref message, save: false } if message == "How much is Premium?"
        ));

        let cli = Cli::parse_from(["bikehero", "history", "--limit", "5"]);
        assert!(matches!(cli.command, Commands::History { limit: 5 }));
    }
}
