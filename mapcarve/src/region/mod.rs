//! Request region model
//!
//! A region is the geographic shape a job extracts: either a bounding box
//! (south, west, north, east) or a GeoJSON geometry. This module owns
//! payload parsing at admission, the canonical stored form, and the boundary
//! file text handed to the extraction tool.

mod geometry;

pub use geometry::{Geometry, Position};

use serde_json::Value;
use thiserror::Error;

/// Region type discriminator for bounding boxes.
pub const BBOX_KIND: &str = "bbox";

/// Region type discriminator for GeoJSON geometry.
pub const GEOJSON_KIND: &str = "geojson";

/// Errors raised while parsing or serializing a request region.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("unsupported region type '{0}'")]
    UnsupportedKind(String),

    #[error("bounding box payload is not a numeric array: {0}")]
    MalformedBbox(#[source] serde_json::Error),

    #[error("bounding box needs at least 4 values, got {0}")]
    BboxTooShort(usize),

    #[error("payload is not a supported GeoJSON geometry: {0}")]
    MalformedGeometry(#[source] serde_json::Error),

    #[error("coordinates contain non-finite values")]
    NonFiniteCoordinate,

    #[error("failed to serialize region: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A validated extraction region.
///
/// Construction guarantees every coordinate is finite, so serialization of
/// an existing region only fails on genuine I/O-level serde errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Bounding box as `[south, west, north, east]`, kept in the order the
    /// caller supplied it.
    Bbox([f64; 4]),
    /// A GeoJSON geometry.
    GeoJson(Geometry),
}

impl Region {
    /// Parses a region from a request's type discriminator and raw payload.
    ///
    /// Bounding box payloads are JSON arrays of numbers; values beyond the
    /// first four are dropped. GeoJSON payloads are geometry objects.
    ///
    /// # Errors
    ///
    /// Returns a [`RegionError`] describing why the payload was rejected.
    /// Every error from here maps to an invalid-region admission rejection.
    pub fn from_payload(kind: &str, payload: &Value) -> Result<Self, RegionError> {
        match kind {
            BBOX_KIND => {
                let values: Vec<f64> = serde_json::from_value(payload.clone())
                    .map_err(RegionError::MalformedBbox)?;
                if values.len() < 4 {
                    return Err(RegionError::BboxTooShort(values.len()));
                }
                Self::bbox([values[0], values[1], values[2], values[3]])
            }
            GEOJSON_KIND => {
                let geometry: Geometry = serde_json::from_value(payload.clone())
                    .map_err(RegionError::MalformedGeometry)?;
                Self::geojson(geometry)
            }
            other => Err(RegionError::UnsupportedKind(other.to_string())),
        }
    }

    /// Builds a bounding box region, validating coordinate finiteness.
    pub fn bbox(bounds: [f64; 4]) -> Result<Self, RegionError> {
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(RegionError::NonFiniteCoordinate);
        }
        Ok(Region::Bbox(bounds))
    }

    /// Builds a GeoJSON region, validating coordinate finiteness.
    pub fn geojson(geometry: Geometry) -> Result<Self, RegionError> {
        if !geometry.is_finite() {
            return Err(RegionError::NonFiniteCoordinate);
        }
        Ok(Region::GeoJson(geometry))
    }

    /// The region's type discriminator.
    ///
    /// Doubles as the extension of the boundary file written for the
    /// extraction tool.
    pub fn kind(&self) -> &'static str {
        match self {
            Region::Bbox(_) => BBOX_KIND,
            Region::GeoJson(_) => GEOJSON_KIND,
        }
    }

    /// The canonical JSON value stored in the job's metadata sidecar.
    pub fn canonical_value(&self) -> Result<Value, RegionError> {
        match self {
            Region::Bbox(bounds) => {
                serde_json::to_value(bounds).map_err(RegionError::Serialize)
            }
            Region::GeoJson(geometry) => {
                serde_json::to_value(geometry).map_err(RegionError::Serialize)
            }
        }
    }

    /// The text written to the boundary file the extraction tool reads.
    ///
    /// Bounding boxes become a bare comma-separated `south,west,north,east`
    /// line; GeoJSON regions become the canonical geometry document.
    pub fn boundary_text(&self) -> Result<String, RegionError> {
        match self {
            Region::Bbox(bounds) => Ok(bounds
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",")),
            Region::GeoJson(geometry) => {
                serde_json::to_string(geometry).map_err(RegionError::Serialize)
            }
        }
    }
}
