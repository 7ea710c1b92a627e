//! # quickopen CLI
//!
//! Incremental file picker for the terminal.
//!
//! ## Usage
//!
//! - `quickopen` - Pick a file interactively; the path is printed or opened
//! - `quickopen search <QUERY>` - Print the list one query produces
//! - `quickopen config` - Show the resolved configuration
//!
//! Every keystroke searches all roots in parallel with the configured search
//! program. When nothing matches, the picker offers to create the file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quickopen_core::PickOutcome;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

mod commands;
mod config;
mod interactive;
mod output;

use commands::{config_command, interactive_command, search_command};
use config::CliConfigLoader;

/// quickopen - Type to find a file, or create it
#[derive(Parser)]
#[command(name = "quickopen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Incremental file picker: type to find a file under your roots, or create it")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory to search (repeatable, defaults to the current directory)
    #[arg(short = 'r', long = "root", value_name = "DIR", global = true)]
    roots: Vec<PathBuf>,

    /// Program that lists files, invoked as `<program> --files -g *<query>*`
    #[arg(long, global = true)]
    search_program: Option<String>,

    /// Maximum number of files kept per root
    #[arg(long, global = true)]
    max_results: Option<usize>,

    /// Command used to open the chosen file instead of printing its path
    #[arg(long, value_name = "CMD", global = true)]
    open_with: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file; the interactive picker logs nowhere else
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query without the picker and print the results
    Search {
        /// Text to look for in file paths
        query: String,
    },

    /// Show the resolved configuration
    Config,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if !cli.roots.is_empty() {
        loader = loader.with_roots_override(cli.roots.clone());
    }

    if let Some(program) = &cli.search_program {
        loader = loader.with_search_program_override(program.clone());
    }

    if let Some(max) = cli.max_results {
        loader = loader.with_max_results_override(max);
    }

    if let Some(command) = &cli.open_with {
        loader = loader.with_open_with_override(command.clone());
    }

    loader
}

/// Where log output goes
#[derive(Debug, PartialEq, Eq)]
enum LogPlan {
    /// `--log-file`, with the given filter
    File(PathBuf, &'static str),
    /// stderr at warn, or debug with `--verbose`
    Stderr { debug: bool },
    /// stderr filtered by `RUST_LOG`
    Env,
    /// The picker owns stderr; without a log file nothing is logged
    Off,
}

fn log_plan(cli: &Cli, rust_log_set: bool) -> LogPlan {
    if let Some(path) = &cli.log_file {
        let filter = if cli.verbose { "debug" } else { "info" };
        return LogPlan::File(path.clone(), filter);
    }

    if cli.command.is_none() {
        LogPlan::Off
    } else if cli.verbose {
        LogPlan::Stderr { debug: true }
    } else if rust_log_set {
        LogPlan::Env
    } else {
        LogPlan::Stderr { debug: false }
    }
}

/// Initialize tracing according to [`log_plan`]
fn init_tracing(cli: &Cli) -> Result<()> {
    match log_plan(cli, std::env::var_os("RUST_LOG").is_some()) {
        LogPlan::File(path, filter) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        LogPlan::Stderr { debug } => quickopen_core::init_tracing_with_debug(debug),
        LogPlan::Env => quickopen_core::init_tracing(),
        LogPlan::Off => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli)?;

    // Build configuration loader
    let config = build_config_loader(&cli).load().await?;

    match cli.command {
        Some(Commands::Search { query }) => search_command(config, query).await,
        Some(Commands::Config) => config_command(config).await,
        // Default to the interactive picker
        None => {
            if interactive_command(config).await? == PickOutcome::NoSelection {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
