//! Tile acquisition orchestration.
//!
//! [`TileService`] ties the pipeline together: for every requested tile it
//! consults the persistent cache, falls back to the network or to the
//! offline placeholder, and delivers the decoded image to the consumer
//! callback. Per tile the outcome is exactly one of *delivered* or
//! *canceled*; failures are logged and produce silence, never an error at
//! the consumer.

use std::sync::Arc;

use bytes::Bytes;
use image::RgbaImage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{no_data_image, TileCache};
use crate::coord::{enumerate_area, GeoRect, TileCoord};
use crate::fetch::{FetchEvent, FetchManager};
use crate::provider::{ReqwestFetcher, TileFetcher, TileSource};

use super::config::{ServiceConfig, ServiceState};
use super::types::{DecodedTileResult, ServiceError, TileHandler};

/// Label text rendered into the offline placeholder tile.
const NO_DATA_LABEL: &str = "NO DATA";

/// Orchestrates cache, network and placeholder delivery for map tiles.
///
/// Create one per tile provider. The service owns the fetch manager and a
/// dispatcher task that serializes completion handling; dropping the
/// service stops the dispatcher once outstanding requests drain.
pub struct TileService {
    source: Arc<dyn TileSource>,
    cache: Option<Arc<TileCache>>,
    state: Arc<ServiceState>,
    fetch: Arc<FetchManager>,
    handler: TileHandler,
    #[allow(dead_code)]
    dispatcher: JoinHandle<()>,
}

impl TileService {
    /// Create a service with the default reqwest transport.
    ///
    /// The cache is opened from `config.cache_dir`; an open failure is
    /// logged and degrades the service to cache-disabled operation rather
    /// than failing construction. Must be called from within a tokio
    /// runtime.
    pub fn new(
        config: ServiceConfig,
        source: Arc<dyn TileSource>,
        handler: TileHandler,
    ) -> Result<Self, ServiceError> {
        let fetcher = Arc::new(ReqwestFetcher::with_timeout(config.request_timeout_secs)?);
        Ok(Self::with_fetcher(config, source, handler, fetcher))
    }

    /// Create a service with a custom transport.
    ///
    /// Used by tests to substitute a mock fetcher; behavior is otherwise
    /// identical to [`TileService::new`].
    pub fn with_fetcher(
        config: ServiceConfig,
        source: Arc<dyn TileSource>,
        handler: TileHandler,
        fetcher: Arc<dyn TileFetcher>,
    ) -> Self {
        let cache = match TileCache::open(&config.cache_dir) {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                // Degraded mode: lookups miss, stores are skipped
                warn!(
                    dir = %config.cache_dir.display(),
                    error = %e,
                    "Cache unavailable, running without persistent cache"
                );
                None
            }
        };

        let state = Arc::new(ServiceState::new(&config));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let fetch = Arc::new(FetchManager::new(fetcher, events_tx));

        let dispatcher = spawn_dispatcher(
            events_rx,
            Arc::clone(&source),
            cache.clone(),
            Arc::clone(&state),
            Arc::clone(&handler),
            Arc::clone(&fetch),
        );

        Self {
            source,
            cache,
            state,
            fetch,
            handler,
            dispatcher,
        }
    }

    /// Request every tile covering `rect` at `zoom`.
    ///
    /// Tiles are issued in row-major order; each one independently goes
    /// through the cache/network/placeholder pipeline. Returns the number
    /// of tiles requested.
    pub fn load_area(&self, rect: &GeoRect, zoom: u8) -> Result<usize, ServiceError> {
        let tiles = enumerate_area(rect, zoom)?;
        debug!(zoom, count = tiles.len(), "Loading tile area");

        for coord in &tiles {
            self.request_tile(*coord);
        }
        Ok(tiles.len())
    }

    /// Acquire a single tile.
    ///
    /// Cache hits and offline placeholders are delivered synchronously on
    /// the calling thread; network results arrive later via the dispatcher.
    pub fn request_tile(&self, coord: TileCoord) {
        let url = self.source.tile_url(coord);

        if self.state.cache_enabled() {
            let cached = self
                .cache
                .as_ref()
                .and_then(|cache| cache.lookup(coord, self.source.name()));

            if let Some(bytes) = cached {
                match decode(&bytes) {
                    Ok(image) => {
                        deliver(&self.handler, coord, image, format!("{}\n{}", url, coord));
                        return;
                    }
                    Err(e) => {
                        // Corrupt cached blob: treat as a miss
                        warn!(%coord, error = %e, "Cached tile failed to decode");
                    }
                }
            }
        }

        if self.state.offline_mode() {
            // Offline short-circuits the network entirely; every miss gets
            // the placeholder.
            deliver(
                &self.handler,
                coord,
                no_data_image(NO_DATA_LABEL),
                format!("offline\n{}", coord),
            );
            return;
        }

        self.fetch.request(coord, url);
    }

    /// Cancel a pending tile request.
    ///
    /// Aborts any in-flight download and suppresses delivery for this
    /// coordinate. A tile already delivered (cache hit, placeholder) cannot
    /// be canceled.
    pub fn cancel_tile(&self, coord: TileCoord) {
        self.fetch.cancel(coord);
    }

    /// Enable or disable the persistent cache. Resets the offline failure
    /// counter.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.state.set_cache_enabled(enabled);
        self.fetch.reset_offline_failures();
    }

    /// Enter or leave offline mode. Resets the offline failure counter.
    pub fn set_offline_mode(&self, offline: bool) {
        self.state.set_offline_mode(offline);
        self.fetch.reset_offline_failures();
    }

    /// Diagnostic count of non-cancellation network failures.
    pub fn offline_failures(&self) -> u32 {
        self.fetch.offline_failures()
    }

    /// Number of downloads currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.fetch.in_flight_count()
    }

    /// Whether the persistent cache opened successfully.
    pub fn cache_available(&self) -> bool {
        self.cache.is_some()
    }
}

/// Spawn the dispatcher task owning completion handling.
///
/// All network completions funnel through this single task: write-through
/// caching, decoding and delivery happen here, serialized, so cache and
/// callback state never see concurrent mutation from the network side.
fn spawn_dispatcher(
    mut events: mpsc::UnboundedReceiver<FetchEvent>,
    source: Arc<dyn TileSource>,
    cache: Option<Arc<TileCache>>,
    state: Arc<ServiceState>,
    handler: TileHandler,
    fetch: Arc<FetchManager>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                FetchEvent::Succeeded {
                    coord,
                    bytes,
                    url,
                    cancel,
                    generation,
                } => {
                    // A cancel issued after the download completed still
                    // wins: no delivery for this coordinate.
                    if cancel.is_cancelled() {
                        debug!(%coord, "Dropping completed fetch for canceled tile");
                        fetch.resolve(coord, generation);
                        continue;
                    }

                    if state.cache_enabled() {
                        if let Some(cache) = &cache {
                            // Write-through is best-effort; delivery proceeds
                            // from the bytes already in hand.
                            if let Err(e) = cache.store(coord, source.name(), &bytes, &url) {
                                warn!(%coord, error = %e, "Failed to cache fetched tile");
                            }
                        }
                    }

                    match decode(&bytes) {
                        Ok(image) => {
                            // Re-check right before the handler runs; the
                            // tile stays cancelable until this point.
                            if cancel.is_cancelled() {
                                debug!(%coord, "Dropping completed fetch for canceled tile");
                            } else {
                                deliver(&handler, coord, image, format!("{}\n{}", url, coord));
                            }
                        }
                        Err(e) => {
                            warn!(%coord, url = %url, error = %e, "Fetched tile failed to decode")
                        }
                    }
                    fetch.resolve(coord, generation);
                }
                FetchEvent::Failed { coord, error } => {
                    // No retry here; the consumer may re-request
                    warn!(%coord, error = %error, "Tile fetch failed, tile will not appear");
                }
            }
        }
    })
}

fn decode(bytes: &Bytes) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

fn deliver(handler: &TileHandler, coord: TileCoord, image: RgbaImage, source_label: String) {
    let result = DecodedTileResult {
        coord,
        image,
        bounds: coord.geo_rect(),
        source_label,
    };
    handler(result);
}
