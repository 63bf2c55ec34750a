//! Coordinate type definitions

use std::fmt;

use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Standard slippy-map zoom levels
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 20;

/// Tile coordinates in the Web Mercator / slippy map grid.
///
/// Identifies one 256×256 tile at a given zoom level. Used as the
/// primary key for cache entries and in-flight network requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level (0-20)
    pub zoom: u8,
    /// X coordinate (east-west), 0 at the antimeridian
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile({},{},{})", self.zoom, self.x, self.y)
    }
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// An axis-aligned geographic rectangle.
///
/// `top_left` is the northwest corner, `bottom_right` the southeast corner.
/// Rectangles crossing the antimeridian or the poles are not normalized;
/// callers must supply corners that do not wrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRect {
    /// Northwest corner
    pub top_left: GeoPoint,
    /// Southeast corner
    pub bottom_right: GeoPoint,
}

impl GeoRect {
    /// Create a new geographic rectangle from its corners.
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside the Web Mercator range
    #[error("Invalid latitude: {0} (must be between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),
    /// Longitude is outside the valid range
    #[error("Invalid longitude: {0} (must be between {MIN_LON} and {MAX_LON})")]
    InvalidLongitude(f64),
    /// Zoom level is outside the valid range
    #[error("Invalid zoom level: {0} (must be between {MIN_ZOOM} and {MAX_ZOOM})")]
    InvalidZoom(u8),
}
