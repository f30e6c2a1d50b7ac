//! Geographic extent rectangles.

use serde::{Deserialize, Serialize};

/// A rectangle in geographic coordinates, in degrees.
///
/// The western and eastern edges are longitudes, the southern and northern
/// edges are latitudes. Bounds are plain data; operations that need a
/// non-degenerate rectangle validate it themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl GeoBounds {
    /// Creates bounds from the western, southern, eastern and northern edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Western edge longitude.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Southern edge latitude.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Eastern edge longitude.
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Northern edge latitude.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center of the rectangle as a `(longitude, latitude)` pair.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Whether the rectangle has positive extent and lies within valid
    /// geographic coordinates.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0
            && self.height() > 0.0
            && self.west >= -180.0
            && self.east <= 180.0
            && self.south >= -90.0
            && self.north <= 90.0
    }
}
