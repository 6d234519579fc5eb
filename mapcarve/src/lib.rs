//! mapcarve - Admission-controlled extraction of geographic regions
//!
//! This library wraps an external extraction tool with cost-based admission
//! control, a bounded job queue, a worker pool, and durable result storage.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use mapcarve::density::DensityGrid;
//! use mapcarve::extract::ExtractTool;
//! use mapcarve::service::{CarveService, ServiceConfig, SubmitRequest};
//! use std::sync::Arc;
//!
//! let grid = Arc::new(DensityGrid::from_png("density.png")?);
//! let tool = ExtractTool::new("/usr/local/bin/osmx", "/data/planet.osmx");
//! let service = CarveService::new(ServiceConfig::default(), tool, grid)?;
//!
//! // Submit a region and poll until it completes
//! let id = service.submit(SubmitRequest {
//!     name: "manhattan".into(),
//!     region_type: "bbox".into(),
//!     region_data: serde_json::json!([40.70, -74.02, 40.88, -73.91]),
//! })?;
//! let status = service.status(&id)?;
//! ```

pub mod config;
pub mod coord;
pub mod density;
pub mod estimate;
pub mod executor;
pub mod extract;
pub mod job;
pub mod logging;
pub mod progress;
pub mod region;
pub mod service;
pub mod store;

/// Version of the mapcarve library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
