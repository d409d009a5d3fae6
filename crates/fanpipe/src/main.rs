//! fanpipe CLI - resize, grayscale and rotate image batches through a
//! concurrent pipeline.
//!
//! Every source under the input directory is written to the output directory
//! once per rotation angle (`x.jpg` → `x_90.jpg`, `x_180.jpg`, ...).
//!
//! # Usage
//!
//! ```bash
//! # Process two files
//! fanpipe process images/a.jpg images/c.jpg
//!
//! # Process a directory, records as JSON Lines
//! fanpipe process images/ --format jsonl --output results.jsonl
//!
//! # View configuration
//! fanpipe config show
//! ```
//!
//! Exit status: 0 when every item succeeded, 2 when any item failed,
//! 1 when the run itself could not complete.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fanpipe_core::{Config, ConfigError};

mod cli;
mod logging;

/// fanpipe - concurrent resize / grayscale / rotate fan-out pipeline.
#[derive(Parser, Debug)]
#[command(name = "fanpipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "FANPIPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run images through the pipeline
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

/// Exit status when at least one item failed.
const EXIT_ITEM_FAILURES: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config problems are held until it is.
    let loaded = load_config(cli.config.as_deref());
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("fanpipe v{}", fanpipe_core::VERSION);

    if let Err(e) = &loaded {
        if cli.config.is_some() {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
        tracing::warn!(
            "Failed to load config: {e}. Using default configuration. \
             Check your config file with `fanpipe config path`."
        );
    }

    let result = match cli.command {
        Commands::Process(args) => cli::process::execute(args, config)
            .await
            .map(|summary| summary.has_failures()),
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref())
            .await
            .map(|()| false),
    };

    match result {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(EXIT_ITEM_FAILURES),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load the config from `--config`, or the default location.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
