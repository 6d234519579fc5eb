//! Shared helpers for resolving CLI inputs against the config file.

use crate::error::CliError;
use mapcarve::config::CarveConfig;
use mapcarve::density::DensityGrid;
use mapcarve::estimate::CoverLimits;
use mapcarve::region::{Geometry, Region};
use std::path::Path;

/// Loads the config from an explicit path or the default location.
pub fn load_config(path: Option<&Path>) -> Result<CarveConfig, CliError> {
    let result = match path {
        Some(path) => CarveConfig::load_from(path),
        None => CarveConfig::load(),
    };
    result.map_err(|e| CliError::Config(e.to_string()))
}

/// Resolves the density grid path and decodes it.
pub fn load_grid(
    config: &CarveConfig,
    override_path: Option<&Path>,
) -> Result<DensityGrid, CliError> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(|| config.paths.density_grid.clone())
        .ok_or_else(|| {
            CliError::Config(
                "No density grid configured. Set paths.density_grid in config.ini or pass --grid"
                    .to_string(),
            )
        })?;
    DensityGrid::from_png(&path).map_err(|error| CliError::GridLoad {
        path: path.display().to_string(),
        error,
    })
}

/// Covering limits from the admission section.
pub fn cover_limits(config: &CarveConfig) -> CoverLimits {
    CoverLimits {
        max_tiles: config.admission.max_cover_tiles,
        max_zoom: config.admission.max_cover_zoom,
    }
}

/// Reads a region file, keyed by extension.
///
/// `.bbox` holds the four bounds as `south,west,north,east`; `.geojson` or
/// `.json` holds a GeoJSON geometry object.
pub fn load_region(path: &Path) -> Result<Region, CliError> {
    let fail = |message: String| CliError::RegionFile {
        path: path.display().to_string(),
        message,
    };

    let text = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match extension {
        "bbox" => {
            let bounds: Vec<f64> = text
                .trim()
                .split(',')
                .map(|part| part.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|e| fail(format!("invalid bound: {}", e)))?;
            if bounds.len() != 4 {
                return Err(fail(format!("expected 4 bounds, got {}", bounds.len())));
            }
            Region::bbox([bounds[0], bounds[1], bounds[2], bounds[3]])
                .map_err(|e| fail(e.to_string()))
        }
        "geojson" | "json" => {
            let geometry: Geometry = serde_json::from_str(&text).map_err(|e| fail(e.to_string()))?;
            Region::geojson(geometry).map_err(|e| fail(e.to_string()))
        }
        other => Err(fail(format!(
            "unsupported extension '{}', expected .bbox or .geojson",
            other
        ))),
    }
}

/// Job display name derived from a region file name.
pub fn region_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("region")
        .to_string()
}
