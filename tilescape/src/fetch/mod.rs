//! Network request management keyed by tile coordinate.
//!
//! [`FetchManager`] owns the map of in-flight tile downloads. It guarantees
//! at most one live request per tile coordinate (a newer request cancels the
//! older one before replacing it), routes completions onto a single event
//! channel, and tracks a saturating failure counter used as an offline
//! diagnostic. Successful completions stay tracked until the consumer
//! resolves them, so cancellation covers the gap between a download
//! finishing and its result being delivered.

mod manager;

pub use manager::{FetchEvent, FetchManager, OFFLINE_FAILURE_CEILING};
