//! Tabscope CLI - analyze tabular datasets from the command line.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            files,
            output,
            config,
            dataset_id,
            pretty,
        } => commands::analyze::run(files, output, config, dataset_id, pretty, cli.verbose),

        Commands::Profile { file, json } => commands::profile::run(file, json, cli.verbose),

        Commands::Config => commands::config::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so reports on stdout stay clean.
fn init_logging(verbose: bool) {
    let default = if verbose { "tabscope=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
