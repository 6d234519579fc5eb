//! Reference-zoom density grid
//!
//! A world-spanning grid of weights at a fixed native zoom, used to predict
//! how much data an extraction region touches. Lookups are keyed by tile
//! coordinate at any zoom:
//!
//! - at the native zoom, the weight is the cell value
//! - coarser than native, the weight is the sum of the covered cell block
//! - finer than native, the weight is the ancestor cell divided by the
//!   number of finer tiles it splits into, floored
//!
//! The on-disk form is a PNG whose pixel weight is `red * 256 + green`, one
//! pixel per native-zoom tile. [`DensityGrid::from_cells`] builds the same
//! grid without a decode step so scaling rules can be exercised directly.

use crate::coord::{TileCoord, MAX_ZOOM};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or constructing a density grid.
#[derive(Debug, Error)]
pub enum DensityError {
    #[error("failed to decode density image: {0}")]
    Image(#[from] image::ImageError),

    #[error("density grid must be square with power-of-two dimensions, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("density grid zoom {0} exceeds the supported maximum of {MAX_ZOOM}")]
    UnsupportedZoom(u8),

    #[error("expected {expected} cells for zoom {zoom}, got {got}")]
    CellCountMismatch {
        zoom: u8,
        expected: usize,
        got: usize,
    },
}

/// World-spanning tile weight grid at a fixed native zoom.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    /// Native zoom level; the grid has `2^zoom` cells per side.
    zoom: u8,
    /// Cells per side.
    side: u32,
    /// Row-major weights, row 0 at the north edge.
    cells: Vec<u16>,
}

impl DensityGrid {
    /// Builds a grid from raw row-major cells at the given native zoom.
    ///
    /// # Errors
    ///
    /// Fails when the zoom is out of range or the cell count does not match
    /// `(2^zoom)^2`.
    pub fn from_cells(zoom: u8, cells: Vec<u16>) -> Result<Self, DensityError> {
        if zoom > MAX_ZOOM {
            return Err(DensityError::UnsupportedZoom(zoom));
        }
        let side = 1u32 << zoom;
        let expected = (side as usize) * (side as usize);
        if cells.len() != expected {
            return Err(DensityError::CellCountMismatch {
                zoom,
                expected,
                got: cells.len(),
            });
        }
        Ok(Self { zoom, side, cells })
    }

    /// Loads a grid from a density PNG on disk.
    pub fn from_png(path: impl AsRef<Path>) -> Result<Self, DensityError> {
        let image = image::open(path)?.to_rgba8();
        Self::from_image(&image)
    }

    /// Builds a grid from a decoded density image.
    ///
    /// The native zoom is derived from the image dimensions: a `4096x4096`
    /// image is a zoom 12 grid. Pixel weight is `red * 256 + green`.
    pub fn from_image(image: &image::RgbaImage) -> Result<Self, DensityError> {
        let (width, height) = image.dimensions();
        if width != height || width == 0 || !width.is_power_of_two() {
            return Err(DensityError::InvalidDimensions { width, height });
        }
        let zoom = width.trailing_zeros() as u8;
        if zoom > MAX_ZOOM {
            return Err(DensityError::UnsupportedZoom(zoom));
        }

        let side = width;
        let mut cells = Vec::with_capacity((side as usize) * (side as usize));
        for row in 0..side {
            for col in 0..side {
                let pixel = image.get_pixel(col, row);
                cells.push(u16::from(pixel[0]) * 256 + u16::from(pixel[1]));
            }
        }
        Ok(Self { zoom, side, cells })
    }

    /// The grid's native zoom level.
    pub fn native_zoom(&self) -> u8 {
        self.zoom
    }

    /// Cells per side at the native zoom.
    pub fn cells_per_side(&self) -> u32 {
        self.side
    }

    /// Weight of a tile at any zoom, applying the zoom scaling rules.
    ///
    /// Tiles outside the grid weigh 0.
    pub fn weight_at(&self, tile: &TileCoord) -> u64 {
        if tile.zoom == self.zoom {
            return self.cell(tile.col, tile.row);
        }

        if tile.zoom < self.zoom {
            // Coarser than native: sum the block of native cells the tile spans.
            let shift = self.zoom - tile.zoom;
            let factor = 1u32 << shift;
            let col0 = tile.col << shift;
            let row0 = tile.row << shift;

            let mut sum = 0u64;
            for row in row0..row0 + factor {
                for col in col0..col0 + factor {
                    sum += self.cell(col, row);
                }
            }
            sum
        } else {
            // Finer than native: an equal floored share of the ancestor cell.
            let shift = tile.zoom - self.zoom;
            let pieces = 1u64 << (2 * u32::from(shift));
            let ancestor = tile.ancestor(self.zoom);
            self.cell(ancestor.col, ancestor.row) / pieces
        }
    }

    fn cell(&self, col: u32, row: u32) -> u64 {
        if col >= self.side || row >= self.side {
            return 0;
        }
        u64::from(self.cells[(row as usize) * (self.side as usize) + (col as usize)])
    }
}
