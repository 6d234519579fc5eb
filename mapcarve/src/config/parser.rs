//! INI parsing logic for converting `Ini` -> `CarveConfig`.
//!
//! This module is the single place where INI key names are mapped to
//! struct fields. Starts from `CarveConfig::default()` and overlays any
//! values found in the INI.

use ini::Ini;
use std::path::PathBuf;

use super::settings::CarveConfig;
use super::ConfigFileError;
use crate::coord::MAX_ZOOM;

pub(super) fn parse_ini(ini: &Ini) -> Result<CarveConfig, ConfigFileError> {
    let mut config = CarveConfig::default();

    // [paths] section
    if let Some(section) = ini.section(Some("paths")) {
        if let Some(v) = section.get("results_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.results_dir = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("work_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.work_dir = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("tool") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.tool = Some(expand_tilde(v));
            }
        }
        if let Some(v) = section.get("database") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.database = Some(expand_tilde(v));
            }
        }
        if let Some(v) = section.get("density_grid") {
            let v = v.trim();
            if !v.is_empty() {
                config.paths.density_grid = Some(expand_tilde(v));
            }
        }
    }

    // [admission] section
    if let Some(section) = ini.section(Some("admission")) {
        if let Some(v) = section.get("cost_ceiling") {
            config.admission.cost_ceiling =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "admission".to_string(),
                    key: "cost_ceiling".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative integer".to_string(),
                })?;
        }
        if let Some(v) = section.get("calibration") {
            let parsed: u64 = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "admission".to_string(),
                key: "calibration".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            if parsed == 0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "admission".to_string(),
                    key: "calibration".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer".to_string(),
                });
            }
            config.admission.calibration = parsed;
        }
        if let Some(v) = section.get("max_cover_tiles") {
            let parsed: usize = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "admission".to_string(),
                key: "max_cover_tiles".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            if parsed == 0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "admission".to_string(),
                    key: "max_cover_tiles".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer".to_string(),
                });
            }
            config.admission.max_cover_tiles = parsed;
        }
        if let Some(v) = section.get("max_cover_zoom") {
            let parsed: u8 = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "admission".to_string(),
                key: "max_cover_zoom".to_string(),
                value: v.to_string(),
                reason: format!("must be an integer between 0 and {MAX_ZOOM}"),
            })?;
            if parsed > MAX_ZOOM {
                return Err(ConfigFileError::InvalidValue {
                    section: "admission".to_string(),
                    key: "max_cover_zoom".to_string(),
                    value: v.to_string(),
                    reason: format!("must be an integer between 0 and {MAX_ZOOM}"),
                });
            }
            config.admission.max_cover_zoom = parsed;
        }
    }

    // [executor] section
    if let Some(section) = ini.section(Some("executor")) {
        if let Some(v) = section.get("queue_capacity") {
            let parsed: usize = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "executor".to_string(),
                key: "queue_capacity".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            if parsed == 0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "executor".to_string(),
                    key: "queue_capacity".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer".to_string(),
                });
            }
            config.executor.queue_capacity = parsed;
        }
        if let Some(v) = section.get("worker_count") {
            // 0 is meaningful here: one worker per available CPU.
            config.executor.worker_count =
                v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "executor".to_string(),
                    key: "worker_count".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative integer (0 = one per CPU)".to_string(),
                })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
        if let Some(v) = section.get("level") {
            let v = v.trim().to_lowercase();
            match v.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    config.logging.level = v;
                }
                _ => {
                    return Err(ConfigFileError::InvalidValue {
                        section: "logging".to_string(),
                        key: "level".to_string(),
                        value: v,
                        reason: "must be one of: trace, debug, info, warn, error".to_string(),
                    });
                }
            }
        }
    }

    Ok(config)
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
