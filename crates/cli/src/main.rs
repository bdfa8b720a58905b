//! SupportDesk CLI: the main entry point.
//!
//! Commands:
//! - `onboard`  Write a default config file
//! - `index`    Build (or rebuild) the corpus indexes
//! - `ask`      Answer a single question
//! - `chat`     Interactive support session with feedback and FAQ browsing
//! - `doctor`   Diagnose configuration and corpus folders

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "supportdesk",
    about = "SupportDesk: customer support answers from your own documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ~/.supportdesk/config.toml
    #[arg(short, long, global = true, env = "SUPPORTDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Build the corpus indexes
    Index {
        /// Re-embed every corpus even if a stored index exists
        #[arg(long)]
        rebuild: bool,
    },

    /// Answer one question and exit
    Ask {
        /// The question
        #[arg(short, long)]
        message: String,

        /// Answer with the tool-using agent instead of plain retrieval
        #[arg(long)]
        agent: bool,
    },

    /// Start an interactive chat session
    Chat {
        /// Start with the agent enabled
        #[arg(long)]
        agent: bool,
    },

    /// Diagnose configuration and corpus folders
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Index { rebuild } => commands::index::run(config_path, rebuild).await?,
        Commands::Ask { message, agent } => commands::ask::run(config_path, message, agent).await?,
        Commands::Chat { agent } => commands::chat::run(config_path, agent).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
