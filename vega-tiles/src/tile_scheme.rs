//! Tile indexing math for the standard XYZ (slippy map) tile scheme.

use serde::{Deserialize, Serialize};

use crate::bounding_box::GeoBounds;
use crate::error::TilesError;

/// Maximum latitude representable in the web mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Shift applied to the far edges of an extent so that tiles are not selected
/// when the extent only touches their boundary.
const EDGE_EPSILON: f64 = 1e-11;

/// Index of a single tile in the XYZ tile scheme.
///
/// `x` grows eastwards from the antimeridian, `y` grows southwards from the
/// north, and zoom level `z` has `2^z` tiles per side.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    /// Zoom level.
    pub z: u32,
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl TileIndex {
    /// Creates a new index.
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Returns the tile containing the given geographic point at the given
    /// zoom level.
    ///
    /// Latitudes beyond the web mercator range and points on the far edges of
    /// the projection are clamped into the valid index range.
    pub fn from_lon_lat(lon: f64, lat: f64, z: u32) -> Self {
        let side = (1u64 << z) as f64;
        let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

        let x = (lon / 360.0 + 0.5) * side;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
            * side;

        let max_index = side - 1.0;
        Self {
            z,
            x: x.clamp(0.0, max_index) as u32,
            y: y.clamp(0.0, max_index) as u32,
        }
    }
}

/// Inclusive range of tile indices covering a geographic extent at one zoom
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// Zoom level of all tiles in the range.
    pub z: u32,
    /// Smallest column index.
    pub x_min: u32,
    /// Largest column index.
    pub x_max: u32,
    /// Smallest row index.
    pub y_min: u32,
    /// Largest row index.
    pub y_max: u32,
}

impl TileRange {
    /// Computes the range of tiles covering the given extent.
    ///
    /// Returns a configuration error if the extent is degenerate or outside
    /// of valid geographic coordinates.
    pub fn from_bounds(bounds: &GeoBounds, z: u32) -> Result<Self, TilesError> {
        if !bounds.is_valid() {
            return Err(TilesError::Configuration(format!(
                "cannot compute a tile range over invalid bounds {bounds:?}"
            )));
        }

        let north_west = TileIndex::from_lon_lat(bounds.west(), bounds.north(), z);
        let south_east = TileIndex::from_lon_lat(
            bounds.east() - EDGE_EPSILON,
            bounds.south() + EDGE_EPSILON,
            z,
        );

        Ok(Self {
            z,
            x_min: north_west.x,
            x_max: south_east.x,
            y_min: north_west.y,
            y_max: south_east.y,
        })
    }

    /// Number of tiles in the range.
    pub fn count(&self) -> u64 {
        (self.x_max - self.x_min + 1) as u64 * (self.y_max - self.y_min + 1) as u64
    }

    /// Iterates over all tile indices in the range.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> + '_ {
        let z = self.z;
        let (y_min, y_max) = (self.y_min, self.y_max);
        (self.x_min..=self.x_max)
            .flat_map(move |x| (y_min..=y_max).map(move |y| TileIndex { z, x, y }))
    }
}

/// Picks a zoom level at which tiles resolve the given extent well.
///
/// The heuristic selects the smallest zoom at which the extent spans at least
/// two tiles along its narrower dimension.
pub fn zoom_for_bounds(bounds: &GeoBounds) -> Result<u32, TilesError> {
    if !bounds.is_valid() {
        return Err(TilesError::Configuration(format!(
            "cannot select a zoom level for invalid bounds {bounds:?}"
        )));
    }

    let zoom_lon = (360.0 * 2.0 / bounds.width()).log2().ceil();
    let zoom_lat = (360.0 * 2.0 / bounds.height()).log2().ceil();
    Ok(zoom_lon.max(zoom_lat).max(0.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_from_point() {
        assert_eq!(
            TileIndex::from_lon_lat(0.0, 0.0, 1),
            TileIndex::new(1, 1, 1)
        );
        assert_eq!(
            TileIndex::from_lon_lat(2.35, 48.85, 2),
            TileIndex::new(2, 2, 1)
        );
        // Berlin, compared against the reference slippy map tile calculator.
        assert_eq!(
            TileIndex::from_lon_lat(13.4, 52.5, 10),
            TileIndex::new(10, 550, 335)
        );
    }

    #[test]
    fn tile_from_point_clamps_to_valid_indices() {
        assert_eq!(
            TileIndex::from_lon_lat(-180.0, 89.9, 3),
            TileIndex::new(3, 0, 0)
        );
        assert_eq!(
            TileIndex::from_lon_lat(180.0, -89.9, 2),
            TileIndex::new(2, 3, 3)
        );
        assert_eq!(
            TileIndex::from_lon_lat(0.0, 0.0, 0),
            TileIndex::new(0, 0, 0)
        );
    }

    #[test]
    fn range_over_whole_world() {
        let bounds = GeoBounds::new(-180.0, -85.0, 180.0, 85.0);
        let range = TileRange::from_bounds(&bounds, 1).unwrap();
        assert_eq!(range.x_min, 0);
        assert_eq!(range.x_max, 1);
        assert_eq!(range.y_min, 0);
        assert_eq!(range.y_max, 1);
        assert_eq!(range.count(), 4);
    }

    #[test]
    fn range_over_city_extent() {
        let bounds = GeoBounds::new(13.3, 52.4, 13.5, 52.6);
        let range = TileRange::from_bounds(&bounds, 10).unwrap();
        assert_eq!(range.x_min, 549);
        assert_eq!(range.x_max, 550);
        assert_eq!(range.y_min, 335);
        assert_eq!(range.y_max, 336);
        assert_eq!(range.iter().count(), 4);
    }

    #[test]
    fn range_does_not_include_touched_tiles() {
        // The extent of exactly one tile must not select its neighbours.
        let bounds = GeoBounds::new(0.0, 0.0, 90.0, 66.513_260_44);
        let range = TileRange::from_bounds(&bounds, 2).unwrap();
        assert_eq!(range.count(), 1);
        assert_eq!(range.iter().next(), Some(TileIndex::new(2, 2, 1)));
    }

    #[test]
    fn range_rejects_invalid_bounds() {
        let bounds = GeoBounds::new(10.0, 20.0, 10.0, 21.0);
        assert!(TileRange::from_bounds(&bounds, 5).is_err());
    }

    #[test]
    fn zoom_selection() {
        let world = GeoBounds::new(-180.0, -85.0, 180.0, 85.0);
        assert_eq!(zoom_for_bounds(&world).unwrap(), 3);

        let city = GeoBounds::new(13.3, 52.4, 13.5, 52.6);
        assert_eq!(zoom_for_bounds(&city).unwrap(), 12);

        let degenerate = GeoBounds::new(13.3, 52.4, 13.3, 52.6);
        assert!(zoom_for_bounds(&degenerate).is_err());
    }
}
