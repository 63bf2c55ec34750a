//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, plus enumeration of the tile grid
//! covering a geographic rectangle.

mod area;
mod types;

pub use area::enumerate_area;
pub use types::{
    CoordError, GeoPoint, GeoRect, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
    MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts a geographic point to tile coordinates.
///
/// # Arguments
///
/// * `zoom` - Zoom level (0 to 20)
/// * `point` - Geographic point (latitude within the Web Mercator range)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn geo_to_tile(zoom: u8, point: GeoPoint) -> Result<TileCoord, CoordError> {
    // Validate inputs
    if !(MIN_LAT..=MAX_LAT).contains(&point.lat) {
        return Err(CoordError::InvalidLatitude(point.lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&point.lon) {
        return Err(CoordError::InvalidLongitude(point.lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    // Number of tiles along each axis at this zoom level
    let n = 2.0_f64.powi(zoom as i32);

    // Convert longitude to tile X coordinate
    let x = (((point.lon + 180.0) / 360.0 * n) as u32).min(n as u32 - 1);

    // Convert latitude to tile Y coordinate using Web Mercator projection
    let lat_rad = point.lat * PI / 180.0;
    let y = ((((1.0 - lat_rad.tan().asinh() / PI) / 2.0) * n) as u32).min(n as u32 - 1);

    Ok(TileCoord { zoom, x, y })
}

/// Converts tile coordinates back to a geographic point.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_geo(coord: TileCoord) -> GeoPoint {
    let n = 2.0_f64.powi(coord.zoom as i32);

    // Convert tile X coordinate to longitude
    let lon = coord.x as f64 / n * 360.0 - 180.0;

    // Convert tile Y coordinate to latitude using inverse Web Mercator
    let y = coord.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    GeoPoint { lat, lon }
}

impl TileCoord {
    /// Returns the geographic rectangle this tile covers.
    ///
    /// The northwest corner of this tile and the northwest corner of its
    /// southeast neighbor bound the tile's placement rectangle.
    pub fn geo_rect(&self) -> GeoRect {
        let top_left = tile_to_geo(*self);
        let bottom_right = tile_to_geo(TileCoord {
            zoom: self.zoom,
            x: self.x + 1,
            y: self.y + 1,
        });
        GeoRect {
            top_left,
            bottom_right,
        }
    }

    /// Returns the geographic center of this tile.
    pub fn geo_center(&self) -> GeoPoint {
        let rect = self.geo_rect();
        GeoPoint {
            lat: (rect.top_left.lat + rect.bottom_right.lat) / 2.0,
            lon: (rect.top_left.lon + rect.bottom_right.lon) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let result = geo_to_tile(16, GeoPoint::new(40.7128, -74.0060));
        assert!(result.is_ok(), "Valid coordinates should not error");

        let tile = result.unwrap();
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = geo_to_tile(10, GeoPoint::new(90.0, 0.0));
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = geo_to_tile(10, GeoPoint::new(0.0, 181.0));
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = geo_to_tile(MAX_ZOOM + 1, GeoPoint::new(0.0, 0.0));
        assert!(matches!(result, Err(CoordError::InvalidZoom(_))));
    }

    #[test]
    fn test_zoom_zero_single_tile() {
        // The whole world is one tile at zoom 0
        let tile = geo_to_tile(0, GeoPoint::new(51.5074, -0.1278)).unwrap();
        assert_eq!(tile, TileCoord::new(0, 0, 0));
    }

    #[test]
    fn test_tile_to_geo_northwest_corner() {
        let tile = TileCoord::new(16, 19295, 24640);
        let point = tile_to_geo(tile);

        // Should be close to NYC (northwest corner of the containing tile)
        assert!((point.lat - 40.713).abs() < 0.01);
        assert!((point.lon - (-74.007)).abs() < 0.01);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let original = GeoPoint::new(40.7128, -74.0060);
        let zoom = 16;

        let tile = geo_to_tile(zoom, original).unwrap();
        let converted = tile_to_geo(tile);

        // Should be close (within tile precision at zoom 16, ~1.2km)
        assert!((converted.lat - original.lat).abs() < 0.01);
        assert!((converted.lon - original.lon).abs() < 0.01);
    }

    #[test]
    fn test_roundtrip_at_different_zooms() {
        let point = GeoPoint::new(51.5074, -0.1278); // London

        for zoom in [0, 5, 10, 15, 20] {
            let tile = geo_to_tile(zoom, point).unwrap();
            let converted = tile_to_geo(tile);

            // Tolerance is the size of one tile at this zoom level
            let tile_size_degrees = 360.0 / (2.0_f64.powi(zoom as i32));

            assert!(
                (converted.lat - point.lat).abs() < tile_size_degrees,
                "zoom {}: lat diff {} exceeds tile size {}",
                zoom,
                (converted.lat - point.lat).abs(),
                tile_size_degrees
            );
            assert!(
                (converted.lon - point.lon).abs() < tile_size_degrees,
                "zoom {}: lon diff {} exceeds tile size {}",
                zoom,
                (converted.lon - point.lon).abs(),
                tile_size_degrees
            );
        }
    }

    #[test]
    fn test_geo_rect_contains_center() {
        let tile = geo_to_tile(12, GeoPoint::new(48.8566, 2.3522)).unwrap(); // Paris
        let rect = tile.geo_rect();
        let center = tile.geo_center();

        assert!(rect.top_left.lat > center.lat);
        assert!(rect.bottom_right.lat < center.lat);
        assert!(rect.top_left.lon < center.lon);
        assert!(rect.bottom_right.lon > center.lon);
    }

    #[test]
    fn test_geo_center_projects_back() {
        // The center of a tile must project back to the same tile
        let tile = TileCoord::new(5, 10, 11);
        let projected = geo_to_tile(5, tile.geo_center()).unwrap();
        assert_eq!(projected, tile);
    }
}
