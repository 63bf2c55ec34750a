//! Tilescape - slippy-map tile acquisition and caching
//!
//! This library turns geographic rectangles into Web Mercator tile requests,
//! serves them from a persistent disk cache where possible, downloads misses
//! over HTTP, and delivers decoded images to a consumer callback. Offline
//! operation substitutes a generated placeholder tile for every miss.
//!
//! # High-Level API
//!
//! The [`service`] module provides the facade most consumers want:
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilescape::service::{ServiceConfig, TileService, TileHandler};
//!
//! let handler: TileHandler = Arc::new(|tile| {
//!     println!("tile {} ready", tile.coord);
//! });
//! let service = TileService::new(ServiceConfig::default(), source, handler)?;
//! service.load_area(&viewport, 12)?;
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod logging;
pub mod provider;
pub mod service;

/// Version of the tilescape library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
