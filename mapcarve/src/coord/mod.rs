//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, plus the per-tile geographic bounds
//! used when covering request geometry with tiles.

mod types;

pub use types::{TileBounds, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Returns the tile containing the given geographic position.
///
/// Inputs are clamped into the Web Mercator valid range, so positions at the
/// poles or past the antimeridian resolve to the nearest edge tile instead of
/// failing. This keeps covering math total over any finite geometry.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees
/// * `lon` - Longitude in degrees
/// * `zoom` - Zoom level (clamped to `MAX_ZOOM`)
#[inline]
pub fn tile_containing(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    let zoom = zoom.min(MAX_ZOOM);
    let lat = lat.clamp(MIN_LAT, MAX_LAT);
    let lon = lon.clamp(MIN_LON, MAX_LON);

    // Calculate number of tiles at this zoom level
    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (1u32 << zoom) - 1;

    // Convert longitude to tile X coordinate
    let col = (((lon + 180.0) / 360.0 * n) as u32).min(max_index);

    // Convert latitude to tile Y coordinate using Web Mercator projection
    let lat_rad = lat * PI / 180.0;
    let row = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32).min(max_index);

    TileCoord { row, col, zoom }
}

/// Returns the geographic bounds of a tile in degrees.
#[inline]
pub fn tile_bounds(tile: &TileCoord) -> TileBounds {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let west = tile.col as f64 / n * 360.0 - 180.0;
    let east = (tile.col + 1) as f64 / n * 360.0 - 180.0;

    // Row 0 is the north edge; row + 1 gives the southern boundary
    let north = inverse_mercator_lat(tile.row as f64 / n);
    let south = inverse_mercator_lat((tile.row + 1) as f64 / n);

    TileBounds {
        west,
        south,
        east,
        north,
    }
}

/// Converts a normalized Mercator Y fraction back to latitude in degrees.
fn inverse_mercator_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}
