//! mapcarve CLI - Command-line interface
//!
//! This binary drives the mapcarve extraction engine from the command line.

use clap::{Parser, Subcommand};

mod commands;
mod error;

use commands::estimate::EstimateArgs;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "mapcarve")]
#[command(about = "Admission-controlled extraction of geographic regions", long_about = None)]
#[command(version = mapcarve::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a region's cost against the admission ceiling
    Estimate(EstimateArgs),
    /// Boot the engine and run region extractions to completion
    Run(RunArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Estimate(args) => commands::estimate::run(args),
        Commands::Run(args) => commands::run::run(args),
    };

    if let Err(err) = result {
        err.exit();
    }
}
