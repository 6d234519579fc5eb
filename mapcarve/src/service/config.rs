//! Service configuration.

use crate::estimate::{CoverLimits, DEFAULT_CALIBRATION};
use crate::executor::ExecutorConfig;
use crate::store::DEFAULT_ARTIFACT_SUFFIX;
use std::path::PathBuf;
use std::time::Duration;

/// Default admission ceiling in cost units.
pub const DEFAULT_COST_CEILING: u64 = 100_000_000;

/// Default dataset timestamp cache window.
pub const DEFAULT_TIMESTAMP_REFRESH: Duration = Duration::from_secs(10);

/// Everything needed to assemble the extraction service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory completion records, metadata and artifacts land in.
    pub results_dir: PathBuf,
    /// Scratch directory for boundary files and in-progress artifacts.
    /// Must share a filesystem with `results_dir`.
    pub work_dir: PathBuf,
    /// Maximum estimated cost a job may have and still be admitted.
    pub cost_ceiling: u64,
    /// Multiplier from summed density weight to cost units.
    pub calibration: u64,
    /// Tile covering limits used by estimation.
    pub cover_limits: CoverLimits,
    /// Queue and worker pool sizing.
    pub executor: ExecutorConfig,
    /// How long a queried dataset timestamp stays fresh.
    pub timestamp_refresh: Duration,
    /// Filename suffix for extracted artifacts.
    pub artifact_suffix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            work_dir: std::env::temp_dir().join("mapcarve"),
            cost_ceiling: DEFAULT_COST_CEILING,
            calibration: DEFAULT_CALIBRATION,
            cover_limits: CoverLimits::default(),
            executor: ExecutorConfig::default(),
            timestamp_refresh: DEFAULT_TIMESTAMP_REFRESH,
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_cost_ceiling(mut self, ceiling: u64) -> Self {
        self.cost_ceiling = ceiling;
        self
    }

    pub fn with_calibration(mut self, calibration: u64) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_cover_limits(mut self, limits: CoverLimits) -> Self {
        self.cover_limits = limits;
        self
    }

    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_timestamp_refresh(mut self, refresh: Duration) -> Self {
        self.timestamp_refresh = refresh;
        self
    }

    pub fn with_artifact_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.artifact_suffix = suffix.into();
        self
    }
}

/// Per-user data directory, falling back to a relative path when the
/// platform exposes none.
fn default_results_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("mapcarve").join("results"))
        .unwrap_or_else(|| PathBuf::from("results"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.cost_ceiling, 100_000_000);
        assert_eq!(config.calibration, DEFAULT_CALIBRATION);
        assert_eq!(config.timestamp_refresh, Duration::from_secs(10));
        assert_eq!(config.artifact_suffix, ".osm.pbf");
        assert_eq!(config.executor.queue_capacity, 512);
    }

    #[test]
    fn test_builders_override() {
        let config = ServiceConfig::new()
            .with_results_dir("/data/results")
            .with_work_dir("/data/tmp")
            .with_cost_ceiling(500)
            .with_calibration(1)
            .with_timestamp_refresh(Duration::from_secs(60))
            .with_artifact_suffix(".pbf");

        assert_eq!(config.results_dir, PathBuf::from("/data/results"));
        assert_eq!(config.work_dir, PathBuf::from("/data/tmp"));
        assert_eq!(config.cost_ceiling, 500);
        assert_eq!(config.calibration, 1);
        assert_eq!(config.timestamp_refresh, Duration::from_secs(60));
        assert_eq!(config.artifact_suffix, ".pbf");
    }
}
