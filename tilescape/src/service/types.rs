//! Result and error types for the acquisition service.

use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;

use crate::coord::{CoordError, GeoRect, TileCoord};
use crate::provider::FetchError;

/// A decoded tile handed to the consumer callback.
///
/// Transient: built at delivery time from cached bytes, a completed
/// download, or the offline placeholder. `bounds` is the geographic
/// rectangle the tile covers, so the consumer can place it without
/// re-deriving the projection.
pub struct DecodedTileResult {
    /// Tile identity
    pub coord: TileCoord,
    /// Decoded pixels, 256×256 for standard providers
    pub image: RgbaImage,
    /// Geographic placement rectangle
    pub bounds: GeoRect,
    /// Debug label: the source URL, or an offline marker
    pub source_label: String,
}

/// Consumer callback invoked on every delivered tile.
pub type TileHandler = Arc<dyn Fn(DecodedTileResult) + Send + Sync>;

/// Errors surfaced when constructing or driving the acquisition service.
///
/// Tile-level failures (network errors, cache write trouble) never surface
/// here; they are handled inside the pipeline and the consumer simply does
/// not receive the affected tile.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The HTTP client could not be constructed.
    #[error(transparent)]
    Client(#[from] FetchError),

    /// A geographic rectangle or zoom level was invalid.
    #[error(transparent)]
    Coord(#[from] CoordError),
}
