//! # olcagraph CLI Module
//!
//! This module implements the CLI interface for olcagraph.
//!
//! ## Available Commands
//!
//! - `write` - Build a batch of process descriptions into the archive
//! - `status` - Show per-type entity counts
//! - `ls` - List stored identifiers
//! - `show` - Print one stored document

mod commands;

use clap::{Parser, Subcommand};
use olcagraph_core::OlcaError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// olcagraph - LCI archive writer
///
/// Builds typed root-entity graphs from loosely shaped process
/// descriptions and merges them into an on-disk archive.
#[derive(Parser, Debug)]
#[command(name = "olcagraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the archive
    #[arg(short = 'D', long, global = true, default_value = "graph.olca")]
    pub archive: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build process descriptions from a file into the archive
    Write {
        /// Path to the input file (JSON object of process descriptions)
        #[arg(short, long)]
        file: PathBuf,

        /// Directory for the cached unit/quantity catalog bundle
        #[arg(short, long, default_value = ".olcagraph")]
        data_dir: PathBuf,

        /// Never fetch the catalog bundle; use cache or built-in table
        #[arg(long)]
        offline: bool,

        /// Write the annotated descriptions back to this path
        #[arg(short, long)]
        annotated: Option<PathBuf>,
    },

    /// Show per-type entity counts
    Status,

    /// List stored identifiers
    Ls {
        /// Restrict to one entity type (e.g. Flow, Process, DQSystem)
        #[arg(short = 't', long)]
        entity_type: Option<String>,
    },

    /// Print one stored document
    Show {
        /// Entity type (e.g. Flow, Process, DQSystem)
        #[arg(short = 't', long)]
        entity_type: String,

        /// Entity identifier
        #[arg(short, long)]
        id: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), OlcaError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Write {
            file,
            data_dir,
            offline,
            annotated,
        }) => cmd_write(
            &cli.archive,
            &file,
            &data_dir,
            offline,
            annotated.as_deref(),
            json_mode,
        ),
        Some(Commands::Status) => cmd_status(&cli.archive, json_mode),
        Some(Commands::Ls { entity_type }) => {
            cmd_ls(&cli.archive, entity_type.as_deref(), json_mode)
        }
        Some(Commands::Show { entity_type, id }) => {
            cmd_show(&cli.archive, &entity_type, &id)
        }
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.archive, json_mode)
        }
    }
}
