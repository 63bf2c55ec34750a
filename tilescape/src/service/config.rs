//! Acquisition service configuration and runtime toggles.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Startup configuration for [`TileService`](super::TileService).
///
/// Replaces the loose global flags of older viewers with one explicit
/// object: everything the service needs to decide between cache, network
/// and placeholder delivery lives here.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the blob store and index database.
    pub cache_dir: PathBuf,
    /// Whether tile lookups/stores consult the persistent cache.
    pub cache_enabled: bool,
    /// Whether network fetches are skipped in favor of the placeholder.
    pub offline_mode: bool,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            cache_enabled: true,
            offline_mode: false,
            request_timeout_secs: 30,
        }
    }
}

/// Runtime-togglable state shared between the service facade and its
/// dispatcher task.
#[derive(Debug)]
pub(crate) struct ServiceState {
    cache_enabled: AtomicBool,
    offline_mode: AtomicBool,
}

impl ServiceState {
    pub(crate) fn new(config: &ServiceConfig) -> Self {
        Self {
            cache_enabled: AtomicBool::new(config.cache_enabled),
            offline_mode: AtomicBool::new(config.offline_mode),
        }
    }

    pub(crate) fn cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::Relaxed)
    }

    pub(crate) fn set_cache_enabled(&self, enabled: bool) {
        self.cache_enabled.store(enabled, Ordering::Relaxed);
    }

    pub(crate) fn offline_mode(&self) -> bool {
        self.offline_mode.load(Ordering::Relaxed)
    }

    pub(crate) fn set_offline_mode(&self, offline: bool) {
        self.offline_mode.store(offline, Ordering::Relaxed);
    }
}
