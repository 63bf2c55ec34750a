//! In-flight request tracking and completion routing.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::coord::TileCoord;
use crate::provider::{FetchError, TileFetcher};

/// Ceiling for the offline failure counter; exceeding it wraps back to zero.
pub const OFFLINE_FAILURE_CEILING: u32 = 50;

/// Completion event emitted for each resolved (non-canceled) request.
#[derive(Debug)]
pub enum FetchEvent {
    /// The download finished and the full body was read.
    ///
    /// The request stays tracked until the consumer acknowledges the event
    /// via [`FetchManager::resolve`], so a cancel arriving between internal
    /// completion and delivery still reaches the token.
    Succeeded {
        /// Tile the request was issued for
        coord: TileCoord,
        /// Raw encoded image bytes
        bytes: Bytes,
        /// URL the bytes came from
        url: String,
        /// Cancellation token of the originating request. Consumers must
        /// check it immediately before delivery: a tile canceled after its
        /// download completed must still be suppressed.
        cancel: CancellationToken,
        /// Tracking identity, passed back to [`FetchManager::resolve`].
        generation: u64,
    },
    /// The download failed for a reason other than cancellation.
    Failed {
        /// Tile the request was issued for
        coord: TileCoord,
        /// What went wrong
        error: FetchError,
    },
}

struct InFlight {
    cancel: CancellationToken,
    generation: u64,
}

/// Tracks one network request per tile coordinate.
///
/// Requests run as independent tokio tasks; completions are serialized onto
/// the event channel handed to [`FetchManager::new`]. The in-flight map is
/// owned exclusively by this type.
pub struct FetchManager {
    fetcher: Arc<dyn TileFetcher>,
    inflight: Arc<DashMap<TileCoord, InFlight>>,
    events: mpsc::UnboundedSender<FetchEvent>,
    offline_failures: Arc<AtomicU32>,
    generations: AtomicU64,
}

impl FetchManager {
    /// Create a manager sending completion events into `events`.
    pub fn new(fetcher: Arc<dyn TileFetcher>, events: mpsc::UnboundedSender<FetchEvent>) -> Self {
        Self {
            fetcher,
            inflight: Arc::new(DashMap::new()),
            events,
            offline_failures: Arc::new(AtomicU32::new(0)),
            generations: AtomicU64::new(0),
        }
    }

    /// Issue a GET for `url`, tracked under `coord`.
    ///
    /// If a request is already in flight for this coordinate it is canceled
    /// first, then replaced; an older handle is never silently orphaned.
    /// Must be called from within a tokio runtime.
    pub fn request(&self, coord: TileCoord, url: String) {
        let cancel = CancellationToken::new();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);

        // Cancel the prior handle before the replacement becomes visible,
        // so a prior task that already completed cannot slip its event past
        // the consumer's token check.
        if let Some((_, previous)) = self.inflight.remove(&coord) {
            debug!(%coord, "Superseding in-flight request, canceling prior handle");
            previous.cancel.cancel();
        }
        self.inflight.insert(
            coord,
            InFlight {
                cancel: cancel.clone(),
                generation,
            },
        );

        trace!(%coord, url = %url, "Dispatching tile request");

        let fetcher = Arc::clone(&self.fetcher);
        let inflight = Arc::clone(&self.inflight);
        let events = self.events.clone();
        let offline_failures = Arc::clone(&self.offline_failures);

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                result = fetcher.fetch(&url) => result,
            };

            // A cancel or supersede that landed while the body was being
            // read must not produce an event.
            if cancel.is_cancelled() {
                return;
            }

            match result {
                Ok(bytes) => {
                    // Stay tracked: the consumer releases the entry via
                    // `resolve` once delivery is decided, keeping `cancel`
                    // effective for the whole completion-to-delivery window.
                    let _ = events.send(FetchEvent::Succeeded {
                        coord,
                        bytes,
                        url,
                        cancel,
                        generation,
                    });
                }
                Err(error) => {
                    // No delivery follows a failure; untrack here, but only
                    // if this task still owns the map entry
                    inflight.remove_if(&coord, |_, entry| entry.generation == generation);
                    bump_offline_counter(&offline_failures);
                    let _ = events.send(FetchEvent::Failed { coord, error });
                }
            }
        });
    }

    /// Abort the in-flight request for `coord`, if any.
    ///
    /// Releases tracking and cancels the underlying transfer. Safe to call
    /// when nothing is in flight.
    pub fn cancel(&self, coord: TileCoord) {
        if let Some((_, entry)) = self.inflight.remove(&coord) {
            debug!(%coord, "Canceling in-flight request");
            entry.cancel.cancel();
        }
    }

    /// Release tracking for a delivered or dropped completion.
    ///
    /// Called by the event consumer once it has decided the fate of a
    /// [`FetchEvent::Succeeded`]; until then the request stays tracked so
    /// [`FetchManager::cancel`] can still reach its token. The generation
    /// guard leaves a superseding entry untouched.
    pub fn resolve(&self, coord: TileCoord, generation: u64) {
        self.inflight
            .remove_if(&coord, |_, entry| entry.generation == generation);
    }

    /// Number of requests currently tracked.
    pub fn in_flight_count(&self) -> usize {
        self.inflight.len()
    }

    /// Current value of the offline failure counter.
    ///
    /// Incremented on every non-cancellation failure; wraps to zero past
    /// [`OFFLINE_FAILURE_CEILING`]. Purely diagnostic: nothing switches to
    /// offline mode automatically.
    pub fn offline_failures(&self) -> u32 {
        self.offline_failures.load(Ordering::Relaxed)
    }

    /// Reset the offline failure counter to zero.
    pub fn reset_offline_failures(&self) {
        self.offline_failures.store(0, Ordering::Relaxed);
    }
}

fn bump_offline_counter(counter: &AtomicU32) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        let next = current + 1;
        Some(if next > OFFLINE_FAILURE_CEILING { 0 } else { next })
    });
}
