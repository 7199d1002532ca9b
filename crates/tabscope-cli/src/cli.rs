//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tabscope: profile tabular data, score its quality and discover relationships
#[derive(Parser)]
#[command(name = "tabscope")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more data files as a single dataset
    Analyze {
        /// Paths to the data files (CSV/TSV/PSV or JSON records)
        #[arg(value_name = "FILES", required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON engine configuration; missing fields keep their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Identifier recorded in the report
        #[arg(long)]
        dataset_id: Option<String>,

        /// Indent the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Profile the columns of a single file
    Profile {
        /// Path to the data file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output profiles as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default engine configuration as JSON
    Config,
}
