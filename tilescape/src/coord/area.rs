//! Enumeration of the tile grid covering a geographic rectangle.

use super::{geo_to_tile, CoordError, GeoRect, TileCoord};

/// Computes the tile coordinates covering a geographic rectangle at a zoom level.
///
/// Projects both corners of the rectangle into tile space and yields every
/// `(x, y)` pair in the half-open grid `top_left.x ≤ x < bottom_right.x`,
/// `top_left.y ≤ y < bottom_right.y`, in row-major order. A rectangle that
/// projects to a zero-width or zero-height grid yields no coordinates.
///
/// Rectangles crossing the antimeridian or poles are not normalized; the
/// caller must supply corners whose projections do not wrap.
///
/// # Errors
///
/// Returns `CoordError` if either corner is outside the valid geographic
/// range or the zoom level is unsupported.
pub fn enumerate_area(rect: &GeoRect, zoom: u8) -> Result<Vec<TileCoord>, CoordError> {
    let top_left = geo_to_tile(zoom, rect.top_left)?;
    let bottom_right = geo_to_tile(zoom, rect.bottom_right)?;

    if bottom_right.x <= top_left.x || bottom_right.y <= top_left.y {
        return Ok(Vec::new());
    }

    let width = (bottom_right.x - top_left.x) as usize;
    let height = (bottom_right.y - top_left.y) as usize;
    let mut tiles = Vec::with_capacity(width * height);

    for y in top_left.y..bottom_right.y {
        for x in top_left.x..bottom_right.x {
            tiles.push(TileCoord { zoom, x, y });
        }
    }

    Ok(tiles)
}
