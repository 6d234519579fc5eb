//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. These are
//! pure data types; parsing lives in [`super::parser`].

use crate::estimate::{DEFAULT_MAX_COVER_TILES, DEFAULT_MAX_COVER_ZOOM};
use crate::service::ServiceConfig;
use std::path::PathBuf;

/// Default log directory relative to the working directory.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "mapcarve.log";

/// Default log level when `RUST_LOG` and the config file are silent.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone)]
pub struct CarveConfig {
    /// Filesystem locations: results, scratch space, tool, database, grid
    pub paths: PathsSettings,
    /// Admission control: ceiling, calibration, covering limits
    pub admission: AdmissionSettings,
    /// Worker pool and queue sizing
    pub executor: ExecutorSettings,
    /// Log destination and verbosity
    pub logging: LoggingSettings,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            paths: PathsSettings::default(),
            admission: AdmissionSettings::default(),
            executor: ExecutorSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Filesystem locations.
///
/// The tool, database, and density grid have no usable defaults; they stay
/// `None` until the config file or a CLI flag provides them.
#[derive(Debug, Clone)]
pub struct PathsSettings {
    /// Durable results directory
    pub results_dir: PathBuf,
    /// Scratch directory for in-flight jobs, same filesystem as results
    pub work_dir: PathBuf,
    /// Extraction tool executable
    pub tool: Option<PathBuf>,
    /// Dataset the tool extracts from
    pub database: Option<PathBuf>,
    /// Density grid PNG used for cost estimation
    pub density_grid: Option<PathBuf>,
}

impl Default for PathsSettings {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            results_dir: service.results_dir,
            work_dir: service.work_dir,
            tool: None,
            database: None,
            density_grid: None,
        }
    }
}

/// Admission control parameters.
#[derive(Debug, Clone)]
pub struct AdmissionSettings {
    /// Maximum admissible estimated cost
    pub cost_ceiling: u64,
    /// Multiplier from summed density to cost units
    pub calibration: u64,
    /// Covering fan-out ceiling in tiles
    pub max_cover_tiles: usize,
    /// Deepest zoom a covering may refine to
    pub max_cover_zoom: u8,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            cost_ceiling: service.cost_ceiling,
            calibration: service.calibration,
            max_cover_tiles: DEFAULT_MAX_COVER_TILES,
            max_cover_zoom: DEFAULT_MAX_COVER_ZOOM,
        }
    }
}

/// Worker pool and queue sizing.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Bounded queue capacity
    pub queue_capacity: usize,
    /// Worker count; 0 means one per available CPU
    pub worker_count: usize,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            queue_capacity: crate::executor::DEFAULT_QUEUE_CAPACITY,
            worker_count: 0,
        }
    }
}

/// Log destination and verbosity.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Directory log files are written to
    pub directory: PathBuf,
    /// Log file name within the directory
    pub file: String,
    /// Default level filter, overridable by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file: DEFAULT_LOG_FILE.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::DEFAULT_COST_CEILING;

    #[test]
    fn test_defaults_mirror_the_service_config() {
        let config = CarveConfig::default();

        assert_eq!(config.admission.cost_ceiling, DEFAULT_COST_CEILING);
        assert_eq!(config.admission.max_cover_tiles, DEFAULT_MAX_COVER_TILES);
        assert_eq!(config.admission.max_cover_zoom, DEFAULT_MAX_COVER_ZOOM);
        assert_eq!(config.executor.worker_count, 0, "0 selects auto sizing");
        assert!(config.paths.tool.is_none());
        assert!(config.paths.database.is_none());
        assert!(config.paths.density_grid.is_none());
    }

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.directory, PathBuf::from("logs"));
        assert_eq!(logging.file, "mapcarve.log");
        assert_eq!(logging.level, "info");
    }
}
