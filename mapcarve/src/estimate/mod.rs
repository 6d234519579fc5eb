//! Admission cost estimation
//!
//! Predicts how expensive an extraction will be before it is allowed to run.
//! The estimate is the sum of density-grid weights over the region's tile
//! covering, scaled by a calibration factor:
//!
//! ```text
//! cost = sum(weight of tile for tile in covering(region)) * calibration
//! ```
//!
//! Estimation is pure: same grid, same region, same configuration always
//! produce the same cost. Admission compares the cost against a ceiling and
//! rejects jobs that exceed it before any resources are committed.

mod cover;

pub use cover::{cover_region, CoverLimits, DEFAULT_MAX_COVER_TILES, DEFAULT_MAX_COVER_ZOOM};

use crate::coord::TileCoord;
use crate::density::DensityGrid;
use crate::region::Region;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Default multiplier from summed grid weight to cost units.
pub const DEFAULT_CALIBRATION: u64 = 32;

/// Cost estimator over a shared density grid.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    grid: Arc<DensityGrid>,
    calibration: u64,
    limits: CoverLimits,
}

impl CostEstimator {
    /// Creates an estimator with default calibration and covering limits.
    pub fn new(grid: Arc<DensityGrid>) -> Self {
        Self {
            grid,
            calibration: DEFAULT_CALIBRATION,
            limits: CoverLimits::default(),
        }
    }

    /// Sets the calibration multiplier.
    pub fn with_calibration(mut self, calibration: u64) -> Self {
        self.calibration = calibration;
        self
    }

    /// Sets the covering limits.
    pub fn with_limits(mut self, limits: CoverLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The covering limits in effect.
    pub fn limits(&self) -> CoverLimits {
        self.limits
    }

    /// Computes the tile covering the estimate is based on.
    pub fn covering(&self, region: &Region) -> BTreeSet<TileCoord> {
        cover_region(region, &self.limits)
    }

    /// Estimates the cost of extracting the given region.
    ///
    /// A region covering zero tiles costs 0.
    pub fn estimate(&self, region: &Region) -> u64 {
        let weight: u64 = self
            .covering(region)
            .iter()
            .map(|tile| self.grid.weight_at(tile))
            .sum();
        weight.saturating_mul(self.calibration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Geometry;

    /// Zoom 2 grid with every cell weighing 10.
    fn uniform_grid() -> Arc<DensityGrid> {
        Arc::new(DensityGrid::from_cells(2, vec![10; 16]).expect("valid grid"))
    }

    fn world_bbox() -> Region {
        Region::bbox([-85.0, -180.0, 85.0, 180.0]).expect("finite bounds")
    }

    #[test]
    fn test_estimate_sums_covering_weights_times_calibration() {
        // Cap the covering at the grid's native zoom so every tile maps to
        // exactly one cell.
        let estimator = CostEstimator::new(uniform_grid()).with_limits(CoverLimits {
            max_tiles: 256,
            max_zoom: 2,
        });

        let cost = estimator.estimate(&world_bbox());
        assert_eq!(cost, 16 * 10 * DEFAULT_CALIBRATION);
    }

    #[test]
    fn test_calibration_scales_linearly() {
        let limits = CoverLimits {
            max_tiles: 256,
            max_zoom: 2,
        };
        let base = CostEstimator::new(uniform_grid())
            .with_limits(limits)
            .with_calibration(1);
        let scaled = CostEstimator::new(uniform_grid())
            .with_limits(limits)
            .with_calibration(7);

        let region = world_bbox();
        assert_eq!(base.estimate(&region) * 7, scaled.estimate(&region));
    }

    #[test]
    fn test_zero_grid_estimates_zero() {
        let grid = Arc::new(DensityGrid::from_cells(2, vec![0; 16]).expect("valid grid"));
        let estimator = CostEstimator::new(grid);
        assert_eq!(estimator.estimate(&world_bbox()), 0);
    }

    #[test]
    fn test_empty_geometry_estimates_zero() {
        let estimator = CostEstimator::new(uniform_grid());
        let region = Region::geojson(Geometry::MultiPoint(vec![])).unwrap();
        assert!(estimator.covering(&region).is_empty());
        assert_eq!(estimator.estimate(&region), 0);
    }

    #[test]
    fn test_finer_than_native_covering_floors_to_zero() {
        // At zoom 4 each tile is 1/16th of a zoom 2 cell; 10 / 16 floors to 0,
        // so the whole-world estimate collapses to nothing.
        let estimator = CostEstimator::new(uniform_grid()).with_limits(CoverLimits {
            max_tiles: 256,
            max_zoom: 4,
        });
        assert_eq!(estimator.estimate(&world_bbox()), 0);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = CostEstimator::new(uniform_grid());
        let region = Region::bbox([10.0, 10.0, 30.0, 30.0]).unwrap();
        assert_eq!(estimator.estimate(&region), estimator.estimate(&region));
    }
}
