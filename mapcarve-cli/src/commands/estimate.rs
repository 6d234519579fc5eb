//! Estimate command - one-shot cost check for a region file.

use clap::Args;
use mapcarve::estimate::CostEstimator;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use super::common::{cover_limits, load_config, load_grid, load_region};
use crate::error::CliError;

/// Arguments for the estimate command.
#[derive(Args)]
pub struct EstimateArgs {
    /// Region file (.bbox with "south,west,north,east", or .geojson)
    pub region: PathBuf,

    /// Config file path (defaults to ~/.mapcarve/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Density grid PNG (overrides paths.density_grid)
    #[arg(long)]
    pub grid: Option<PathBuf>,

    /// Admission ceiling (overrides admission.cost_ceiling)
    #[arg(long)]
    pub ceiling: Option<u64>,
}

/// Run the estimate command.
///
/// Prints the covering, the estimated cost, and the admission verdict.
/// Exits with code 2 when the cost exceeds the ceiling, so scripts can
/// branch on admissibility.
pub fn run(args: EstimateArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let grid = load_grid(&config, args.grid.as_deref())?;
    let region = load_region(&args.region)?;
    let ceiling = args.ceiling.unwrap_or(config.admission.cost_ceiling);

    let estimator = CostEstimator::new(Arc::new(grid))
        .with_calibration(config.admission.calibration)
        .with_limits(cover_limits(&config));

    let covering = estimator.covering(&region);
    let cost = estimator.estimate(&region);

    println!("Region: {}", args.region.display());
    match covering.iter().next() {
        Some(tile) => println!("Covering: {} tiles at zoom {}", covering.len(), tile.zoom),
        None => println!("Covering: empty"),
    }
    println!("Estimated cost: {}", cost);
    println!("Ceiling: {}", ceiling);

    if cost > ceiling {
        println!("Verdict: rejected (cost exceeds ceiling by {})", cost - ceiling);
        process::exit(2);
    }

    println!("Verdict: admitted");
    Ok(())
}
