//! Persistent tile cache.
//!
//! Two cooperating pieces back the cache: a flat blob directory holding one
//! file per cached tile (raw encoded image bytes) and a SQLite index mapping
//! `(scheme, x, y, zoom)` to the blob filename plus timestamps and size.
//!
//! The cache is strictly best-effort: open failures degrade the service to
//! cache-disabled operation, read inconsistencies count as misses, and a
//! failed store never leaves an index row pointing at a missing blob.
//!
//! Expiry is not enforced; `created_at` / `created_at_epoch` are recorded
//! for diagnostics and future eviction policies.

mod index;
mod placeholder;
mod store;
mod types;

pub use index::TileIndex;
pub use placeholder::{no_data_image, PLACEHOLDER_SIZE};
pub use store::{blob_name_from_source, TileCache};
pub use types::CacheError;
