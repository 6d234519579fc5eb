//! Coordinate type definitions

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels supported by the tile math
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;

/// Tile coordinates in the Web Mercator / Slippy Map system.
///
/// `Ord` is derived so tile sets iterate in a stable row-major order,
/// which keeps coverings deterministic for identical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    /// Number of tiles along one axis at this tile's zoom level.
    #[inline]
    pub fn tiles_per_side(&self) -> u32 {
        1u32 << self.zoom
    }

    /// Returns the ancestor tile containing this tile at a coarser zoom.
    ///
    /// For `zoom >= self.zoom` the tile itself is returned.
    #[inline]
    pub fn ancestor(&self, zoom: u8) -> TileCoord {
        if zoom >= self.zoom {
            return *self;
        }
        let shift = self.zoom - zoom;
        TileCoord {
            row: self.row >> shift,
            col: self.col >> shift,
            zoom,
        }
    }
}

/// Geographic bounds of a tile in degrees.
///
/// `west`/`east` are longitudes, `south`/`north` latitudes. Bounds are
/// treated as closed on all edges, so geometry touching a shared tile
/// boundary intersects the tiles on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl TileBounds {
    /// Whether the given position lies within these bounds (edges inclusive).
    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}
