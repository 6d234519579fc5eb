//! Tile covering of request regions.
//!
//! A covering is the set of Web Mercator tiles a region touches, computed at
//! the finest zoom whose tile count stays within a fan-out ceiling. Refinement
//! walks zoom levels from 0 upward and keeps the last covering that fits, so
//! identical regions always produce identical coverings.

use crate::coord::{self, TileBounds, TileCoord};
use crate::region::{Geometry, Position, Region};
use std::collections::BTreeSet;

/// Default ceiling on covering size.
pub const DEFAULT_MAX_COVER_TILES: usize = 256;

/// Default finest zoom a covering refines to.
pub const DEFAULT_MAX_COVER_ZOOM: u8 = 14;

/// Candidate-scan budget multiplier over the tile ceiling. Scans wider than
/// this abort the zoom level, falling back to the coarser covering.
const SCAN_FACTOR: u64 = 16;

/// Limits applied while covering a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverLimits {
    /// Largest covering size accepted before refinement stops.
    pub max_tiles: usize,
    /// Finest zoom refinement may reach.
    pub max_zoom: u8,
}

impl Default for CoverLimits {
    fn default() -> Self {
        Self {
            max_tiles: DEFAULT_MAX_COVER_TILES,
            max_zoom: DEFAULT_MAX_COVER_ZOOM,
        }
    }
}

/// Computes the covering of a region under the given limits.
///
/// The result is the finest covering within `limits.max_tiles`, never finer
/// than `limits.max_zoom`. A geometry with no coordinate positions covers
/// zero tiles. Iteration order of the returned set is stable, so equal
/// regions yield equal coverings.
pub fn cover_region(region: &Region, limits: &CoverLimits) -> BTreeSet<TileCoord> {
    let max_zoom = limits.max_zoom.min(coord::MAX_ZOOM);
    let max_tiles = limits.max_tiles.max(1);

    let mut covering = match cover_at_zoom(region, 0, max_tiles) {
        Some(tiles) => tiles,
        None => return BTreeSet::new(),
    };
    if covering.is_empty() {
        // No positions at all; finer zooms cannot add any.
        return covering;
    }

    for zoom in 1..=max_zoom {
        match cover_at_zoom(region, zoom, max_tiles) {
            Some(refined) => covering = refined,
            None => break,
        }
    }
    covering
}

/// Covers the region at a single zoom, or `None` when the tile ceiling or
/// the scan budget is exceeded.
fn cover_at_zoom(region: &Region, zoom: u8, max_tiles: usize) -> Option<BTreeSet<TileCoord>> {
    let mut acc = TileBudget::new(max_tiles);
    match region {
        Region::Bbox(bounds) => {
            let (south, west, north, east) = normalized_bounds(bounds);
            cover_rect(south, west, north, east, zoom, &mut acc)?;
        }
        Region::GeoJson(geometry) => cover_geometry(geometry, zoom, &mut acc)?,
    }
    Some(acc.tiles)
}

/// Normalizes bbox corners to (south, west, north, east) regardless of the
/// order the caller supplied them in.
fn normalized_bounds(bounds: &[f64; 4]) -> (f64, f64, f64, f64) {
    let south = bounds[0].min(bounds[2]);
    let north = bounds[0].max(bounds[2]);
    let west = bounds[1].min(bounds[3]);
    let east = bounds[1].max(bounds[3]);
    (south, west, north, east)
}

fn cover_geometry(geometry: &Geometry, zoom: u8, acc: &mut TileBudget) -> Option<()> {
    match geometry {
        Geometry::Point(p) => acc.insert(position_tile(p, zoom)),
        Geometry::MultiPoint(points) => {
            for p in points {
                acc.insert(position_tile(p, zoom))?;
            }
            Some(())
        }
        Geometry::LineString(points) => cover_line(points, zoom, acc),
        Geometry::Polygon(rings) => cover_polygon(rings, zoom, acc),
        Geometry::MultiPolygon(polygons) => {
            for rings in polygons {
                cover_polygon(rings, zoom, acc)?;
            }
            Some(())
        }
    }
}

fn position_tile(p: &Position, zoom: u8) -> TileCoord {
    coord::tile_containing(p[1], p[0], zoom)
}

fn cover_rect(
    south: f64,
    west: f64,
    north: f64,
    east: f64,
    zoom: u8,
    acc: &mut TileBudget,
) -> Option<()> {
    let nw = coord::tile_containing(north, west, zoom);
    let se = coord::tile_containing(south, east, zoom);
    for row in nw.row..=se.row {
        for col in nw.col..=se.col {
            acc.insert(TileCoord { row, col, zoom })?;
        }
    }
    Some(())
}

fn cover_line(points: &[Position], zoom: u8, acc: &mut TileBudget) -> Option<()> {
    for p in points {
        acc.insert(position_tile(p, zoom))?;
    }
    for pair in points.windows(2) {
        cover_segment(&pair[0], &pair[1], zoom, acc)?;
    }
    Some(())
}

fn cover_segment(a: &Position, b: &Position, zoom: u8, acc: &mut TileBudget) -> Option<()> {
    let ta = position_tile(a, zoom);
    let tb = position_tile(b, zoom);
    let row0 = ta.row.min(tb.row);
    let row1 = ta.row.max(tb.row);
    let col0 = ta.col.min(tb.col);
    let col1 = ta.col.max(tb.col);

    if !acc.scan_allowed(row0, row1, col0, col1) {
        return None;
    }
    for row in row0..=row1 {
        for col in col0..=col1 {
            let tile = TileCoord { row, col, zoom };
            if segment_intersects_rect(a, b, &coord::tile_bounds(&tile)) {
                acc.insert(tile)?;
            }
        }
    }
    Some(())
}

fn cover_polygon(rings: &[Vec<Position>], zoom: u8, acc: &mut TileBudget) -> Option<()> {
    // Boundary positions are always covered, even for degenerate rings.
    for ring in rings {
        for p in ring {
            acc.insert(position_tile(p, zoom))?;
        }
    }

    let outer = match rings.first() {
        Some(ring) if ring.len() >= 3 => ring,
        _ => return Some(()),
    };

    let (south, west, north, east) = ring_bound(outer);
    let nw = coord::tile_containing(north, west, zoom);
    let se = coord::tile_containing(south, east, zoom);
    if !acc.scan_allowed(nw.row, se.row, nw.col, se.col) {
        return None;
    }

    for row in nw.row..=se.row {
        for col in nw.col..=se.col {
            let tile = TileCoord { row, col, zoom };
            if rect_intersects_polygon(&coord::tile_bounds(&tile), rings) {
                acc.insert(tile)?;
            }
        }
    }
    Some(())
}

fn ring_bound(ring: &[Position]) -> (f64, f64, f64, f64) {
    let mut south = f64::INFINITY;
    let mut west = f64::INFINITY;
    let mut north = f64::NEG_INFINITY;
    let mut east = f64::NEG_INFINITY;
    for p in ring {
        west = west.min(p[0]);
        east = east.max(p[0]);
        south = south.min(p[1]);
        north = north.max(p[1]);
    }
    (south, west, north, east)
}

// =============================================================================
// Intersection predicates
// =============================================================================

/// Whether a rectangle intersects a polygon (outer ring minus holes),
/// boundaries inclusive.
fn rect_intersects_polygon(rect: &TileBounds, rings: &[Vec<Position>]) -> bool {
    // Any polygon vertex inside the rectangle.
    if rings.iter().flatten().any(|p| rect.contains(p[1], p[0])) {
        return true;
    }

    // Any rectangle corner inside the polygon. Even-odd counting makes
    // holes subtract, so a rectangle fully inside a hole does not match.
    let corners = [
        [rect.west, rect.south],
        [rect.east, rect.south],
        [rect.east, rect.north],
        [rect.west, rect.north],
    ];
    if corners.iter().any(|c| point_in_polygon(c, rings)) {
        return true;
    }

    // Any ring edge crossing the rectangle.
    for ring in rings {
        let n = ring.len();
        if n < 2 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            if segment_intersects_rect(&ring[j], &ring[i], rect) {
                return true;
            }
            j = i;
        }
    }
    false
}

/// Even-odd point-in-polygon over all rings.
fn point_in_polygon(p: &Position, rings: &[Vec<Position>]) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (ring[i][0], ring[i][1]);
            let (xj, yj) = (ring[j][0], ring[j][1]);
            let straddles = (yi > p[1]) != (yj > p[1]);
            if straddles && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

/// Whether a segment touches a rectangle, boundaries inclusive.
fn segment_intersects_rect(a: &Position, b: &Position, rect: &TileBounds) -> bool {
    if rect.contains(a[1], a[0]) || rect.contains(b[1], b[0]) {
        return true;
    }
    let corners = [
        [rect.west, rect.south],
        [rect.east, rect.south],
        [rect.east, rect.north],
        [rect.west, rect.north],
    ];
    for i in 0..4 {
        if segments_intersect(a, b, &corners[i], &corners[(i + 1) % 4]) {
            return true;
        }
    }
    false
}

/// Segment intersection via orientation tests, with collinear touching
/// counted as intersecting.
fn segments_intersect(p1: &Position, p2: &Position, p3: &Position, p4: &Position) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

/// Cross product of (b - a) x (c - a).
fn cross(a: &Position, b: &Position, c: &Position) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Whether `c`, already known collinear with `a`-`b`, lies within the
/// segment's bounding box.
fn on_segment(a: &Position, b: &Position, c: &Position) -> bool {
    c[0] >= a[0].min(b[0])
        && c[0] <= a[0].max(b[0])
        && c[1] >= a[1].min(b[1])
        && c[1] <= a[1].max(b[1])
}

// =============================================================================
// Tile accumulation
// =============================================================================

/// Tile set accumulator that aborts a zoom level when the ceiling or the
/// candidate-scan budget is exceeded.
struct TileBudget {
    tiles: BTreeSet<TileCoord>,
    max_tiles: usize,
    scan_budget: u64,
}

impl TileBudget {
    fn new(max_tiles: usize) -> Self {
        Self {
            tiles: BTreeSet::new(),
            max_tiles,
            scan_budget: (max_tiles as u64).saturating_mul(SCAN_FACTOR),
        }
    }

    /// Inserts a tile; `None` once the set outgrows the ceiling.
    fn insert(&mut self, tile: TileCoord) -> Option<()> {
        self.tiles.insert(tile);
        (self.tiles.len() <= self.max_tiles).then_some(())
    }

    /// Whether an inclusive row/col candidate rectangle is within the scan
    /// budget.
    fn scan_allowed(&self, row0: u32, row1: u32, col0: u32, col1: u32) -> bool {
        let rows = u64::from(row1 - row0) + 1;
        let cols = u64::from(col1 - col0) + 1;
        rows.saturating_mul(cols) <= self.scan_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Geometry;

    fn bbox(bounds: [f64; 4]) -> Region {
        Region::bbox(bounds).expect("finite bounds")
    }

    #[test]
    fn test_small_bbox_refines_to_max_zoom() {
        let region = bbox([0.0, 0.0, 0.01, 0.01]);
        let covering = cover_region(&region, &CoverLimits::default());

        assert!(!covering.is_empty());
        assert!(
            covering.iter().all(|t| t.zoom == DEFAULT_MAX_COVER_ZOOM),
            "A tiny region should refine all the way to the max zoom"
        );
        assert!(
            covering.len() <= 4,
            "A 0.01 degree box covers a handful of zoom 14 tiles, got {}",
            covering.len()
        );
    }

    #[test]
    fn test_large_bbox_stops_before_exceeding_ceiling() {
        let region = bbox([0.0, 0.0, 45.0, 45.0]);
        let covering = cover_region(&region, &CoverLimits::default());

        assert!(
            covering.len() <= DEFAULT_MAX_COVER_TILES,
            "Covering must stay within the ceiling, got {}",
            covering.len()
        );
        // At zoom 7 this box needs 323 tiles, so refinement stops at zoom 6.
        assert!(covering.iter().all(|t| t.zoom == 6));
        assert_eq!(covering.len(), 90);
    }

    #[test]
    fn test_world_bbox_with_ceiling_of_one_keeps_the_root_tile() {
        let region = bbox([-85.0, -180.0, 85.0, 180.0]);
        let limits = CoverLimits {
            max_tiles: 1,
            max_zoom: 14,
        };
        let covering = cover_region(&region, &limits);

        assert_eq!(covering.len(), 1);
        let root = covering.iter().next().unwrap();
        assert_eq!(
            (root.row, root.col, root.zoom),
            (0, 0, 0),
            "Only the root tile fits a ceiling of one"
        );
    }

    #[test]
    fn test_covering_is_deterministic() {
        let region = bbox([10.0, 10.0, 20.0, 20.0]);
        let limits = CoverLimits::default();

        let first: Vec<_> = cover_region(&region, &limits).into_iter().collect();
        let second: Vec<_> = cover_region(&region, &limits).into_iter().collect();
        assert_eq!(first, second, "Equal input must yield identical coverings");
    }

    #[test]
    fn test_inverted_bbox_corners_are_normalized() {
        let normal = cover_region(&bbox([10.0, 10.0, 20.0, 20.0]), &CoverLimits::default());
        let inverted = cover_region(&bbox([20.0, 20.0, 10.0, 10.0]), &CoverLimits::default());
        assert_eq!(normal, inverted);
    }

    #[test]
    fn test_empty_geometry_covers_nothing() {
        let region = Region::geojson(Geometry::MultiPoint(vec![])).unwrap();
        assert!(cover_region(&region, &CoverLimits::default()).is_empty());

        let region = Region::geojson(Geometry::Polygon(vec![])).unwrap();
        assert!(cover_region(&region, &CoverLimits::default()).is_empty());
    }

    #[test]
    fn test_point_covers_one_tile_per_zoom() {
        let region = Region::geojson(Geometry::Point([-0.1278, 51.5074])).unwrap();
        let covering = cover_region(&region, &CoverLimits::default());

        assert_eq!(covering.len(), 1);
        let tile = covering.iter().next().unwrap();
        assert_eq!(tile.zoom, DEFAULT_MAX_COVER_ZOOM);
        assert_eq!(*tile, coord::tile_containing(51.5074, -0.1278, 14));
    }

    #[test]
    fn test_square_polygon_matches_equivalent_bbox() {
        let ring = vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ];
        let polygon = Region::geojson(Geometry::Polygon(vec![ring])).unwrap();
        let equivalent = bbox([0.0, 0.0, 10.0, 10.0]);
        let limits = CoverLimits::default();

        assert_eq!(
            cover_region(&polygon, &limits),
            cover_region(&equivalent, &limits),
            "An axis-aligned square polygon should cover exactly its bbox"
        );
    }

    #[test]
    fn test_polygon_hole_excludes_interior_tiles() {
        let outer = vec![
            [0.0, 0.0],
            [45.0, 0.0],
            [45.0, 45.0],
            [0.0, 45.0],
            [0.0, 0.0],
        ];
        let hole = vec![
            [11.25, 11.25],
            [33.75, 11.25],
            [33.75, 33.75],
            [11.25, 33.75],
            [11.25, 11.25],
        ];
        let limits = CoverLimits {
            max_tiles: 10_000,
            max_zoom: 6,
        };

        let solid =
            cover_region(&Region::geojson(Geometry::Polygon(vec![outer.clone()])).unwrap(), &limits);
        let holed =
            cover_region(&Region::geojson(Geometry::Polygon(vec![outer, hole])).unwrap(), &limits);

        // Zoom 6 tile (row 28, col 35) sits strictly inside the hole.
        let inside_hole = TileCoord {
            row: 28,
            col: 35,
            zoom: 6,
        };
        assert!(solid.contains(&inside_hole), "Solid polygon covers the tile");
        assert!(
            !holed.contains(&inside_hole),
            "Tile strictly inside the hole must be excluded"
        );
        assert!(
            holed.is_subset(&solid),
            "Adding a hole can only remove tiles"
        );
        // Tiles between the hole and the outer boundary survive.
        assert!(holed.contains(&coord::tile_containing(44.0, 1.0, 6)));
    }

    #[test]
    fn test_linestring_covers_the_diagonal_not_the_rect() {
        let line = Region::geojson(Geometry::LineString(vec![[0.0, 0.0], [10.0, 10.0]])).unwrap();
        let limits = CoverLimits {
            max_tiles: 256,
            max_zoom: 8,
        };
        let covering = cover_region(&line, &limits);

        assert!(covering.iter().all(|t| t.zoom == 8));
        assert!(covering.contains(&coord::tile_containing(0.0, 0.0, 8)));
        assert!(covering.contains(&coord::tile_containing(10.0, 10.0, 8)));
        assert!(
            covering.len() < 30,
            "A diagonal line should cover far fewer tiles than the full rect, got {}",
            covering.len()
        );
    }

    #[test]
    fn test_multipolygon_unions_parts() {
        let west = vec![vec![
            [0.0, 0.0],
            [5.0, 0.0],
            [5.0, 5.0],
            [0.0, 5.0],
            [0.0, 0.0],
        ]];
        let east = vec![vec![
            [20.0, 0.0],
            [25.0, 0.0],
            [25.0, 5.0],
            [20.0, 5.0],
            [20.0, 0.0],
        ]];
        let limits = CoverLimits {
            max_tiles: 10_000,
            max_zoom: 6,
        };

        let multi = cover_region(
            &Region::geojson(Geometry::MultiPolygon(vec![west.clone(), east.clone()])).unwrap(),
            &limits,
        );
        let west_only =
            cover_region(&Region::geojson(Geometry::Polygon(west)).unwrap(), &limits);
        let east_only =
            cover_region(&Region::geojson(Geometry::Polygon(east)).unwrap(), &limits);

        let union: BTreeSet<_> = west_only.union(&east_only).copied().collect();
        assert_eq!(multi, union);
    }

    #[test]
    fn test_segment_rect_predicates() {
        let rect = TileBounds {
            west: 0.0,
            south: 0.0,
            east: 1.0,
            north: 1.0,
        };

        assert!(segment_intersects_rect(&[-1.0, 0.5], &[2.0, 0.5], &rect));
        assert!(segment_intersects_rect(&[0.5, 0.5], &[5.0, 5.0], &rect));
        assert!(
            segment_intersects_rect(&[-1.0, 1.0], &[2.0, 1.0], &rect),
            "Touching the north edge counts as intersecting"
        );
        assert!(!segment_intersects_rect(&[-1.0, 2.0], &[2.0, 2.0], &rect));
        assert!(!segment_intersects_rect(&[2.0, 0.0], &[3.0, 1.0], &rect));
    }

    #[test]
    fn test_point_in_polygon_with_hole() {
        let rings = vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]],
        ];

        assert!(point_in_polygon(&[2.0, 2.0], &rings));
        assert!(!point_in_polygon(&[5.0, 5.0], &rings), "Inside the hole");
        assert!(!point_in_polygon(&[11.0, 5.0], &rings), "Outside entirely");
    }
}
