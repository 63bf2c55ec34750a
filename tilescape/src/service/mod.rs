//! Tile acquisition service.
//!
//! The top-level entry point of the crate: [`TileService`] accepts tile and
//! area requests, checks the persistent cache, downloads misses (or renders
//! the offline placeholder), and delivers decoded images to a consumer
//! callback.

mod acquisition;
mod config;
mod types;

pub use acquisition::TileService;
pub use config::ServiceConfig;
pub use types::{DecodedTileResult, ServiceError, TileHandler};
