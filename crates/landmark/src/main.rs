//! Landmark Explorer CLI - identify a landmark in a photo and learn about it.
//!
//! The photo is classified by a remote vision service; on a confident match
//! you can ask for a description, its history, fun facts or nearby
//! attractions, optionally translated into Arabic, French, Spanish, Chinese
//! or German.
//!
//! # Usage
//!
//! ```bash
//! # Identify a photo and pick questions from a menu
//! landmark identify tower.jpg
//!
//! # One-shot question, translated to French, JSON report on stdout
//! landmark identify tower.jpg --intent history --language fr --format json
//!
//! # Camera capture piped in
//! capture-frame | landmark identify --source camera
//!
//! # Configuration
//! landmark config check
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Landmark Explorer - identify landmarks and get multilingual information.
#[derive(Parser, Debug)]
#[command(name = "landmark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Identify the landmark in an image and ask about it
    Identify(cli::identify::IdentifyArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match landmark_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `landmark config path`."
            );
            landmark_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Landmark Explorer v{}", landmark_core::VERSION);

    match cli.command {
        Commands::Identify(args) => cli::identify::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}
