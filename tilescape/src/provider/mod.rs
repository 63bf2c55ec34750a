//! Tile provider abstraction
//!
//! A [`TileSource`] supplies the provider scheme name (used to namespace
//! cache entries) and the URL for any tile coordinate. The URL-templating
//! scheme of a concrete provider is deliberately outside this crate; map
//! layers implement the trait for whichever server they talk to.
//!
//! The [`TileFetcher`] trait abstracts the HTTP transport so tests can
//! substitute a mock client for the default reqwest implementation.

mod http;

pub use http::{BoxFuture, FetchError, ReqwestFetcher, TileFetcher, LEGACY_USER_AGENT};

#[cfg(test)]
pub use http::tests::MockFetcher;

use crate::coord::TileCoord;

/// A pluggable tile provider: scheme name plus URL templating.
pub trait TileSource: Send + Sync {
    /// Provider/layer name, used to namespace cache entries.
    fn name(&self) -> &str;

    /// URL of the tile image for the given coordinate.
    fn tile_url(&self, coord: TileCoord) -> String;
}
