//! Binary entry point for notegap.
//!
//! Extracts concepts from a note, or compares a note against its peers, and
//! prints JSON on stdout.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{cmd_compare, cmd_extract};
use notegap::NotegapConfig;
use notegap::observability;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Notegap - find the concepts your notes share with, and miss from, your peers'.
#[derive(Parser)]
#[command(name = "notegap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Extract key concepts from a note.
    Extract {
        /// Note to read.
        file: PathBuf,

        /// Maximum number of concepts.
        #[arg(short, long)]
        max_concepts: Option<usize>,

        /// Similarity threshold for deduplication, in [0, 1].
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Deduplication method: string or semantic.
        #[arg(short = 'M', long)]
        method: Option<String>,

        /// Extraction strategy: keyword or syntactic.
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Compare a note against peer notes.
    Compare {
        /// Note to compare.
        target: PathBuf,

        /// Peer notes.
        #[arg(required = true)]
        peers: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Extract {
            file,
            max_concepts,
            threshold,
            method,
            strategy,
        } => cmd_extract(&config, &file, max_concepts, threshold, method, strategy),

        Commands::Compare { target, peers } => cmd_compare(&config, &target, &peers),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration: explicit path, then `NOTEGAP_CONFIG_PATH`, then the
/// default location. Environment overrides apply last.
fn load_config(path: Option<&Path>) -> anyhow::Result<NotegapConfig> {
    let config = if let Some(config_path) = path {
        NotegapConfig::load_from_file(config_path)?
    } else if let Ok(config_path) = std::env::var("NOTEGAP_CONFIG_PATH")
        && !config_path.trim().is_empty()
    {
        NotegapConfig::load_from_file(Path::new(&config_path))?
    } else {
        NotegapConfig::load_default()
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
