//! Persistent tile cache: blob directory plus metadata index.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::cache::index::TileIndex;
use crate::cache::types::CacheError;
use crate::coord::TileCoord;

/// Filename of the index database inside the cache directory.
const INDEX_FILE: &str = "cache.db";

/// Durable mapping from `(scheme, x, y, zoom)` to raw tile bytes.
///
/// Raw encoded images (PNG/JPEG, undecoded) live one-file-per-tile in the
/// cache directory; the SQLite index resolves tile identity to the blob
/// filename. Entries are never deleted by this store; the cache directory
/// persists across runs.
pub struct TileCache {
    blob_dir: PathBuf,
    index: TileIndex,
}

impl TileCache {
    /// Open the cache rooted at `dir`, creating the directory and index
    /// schema as needed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the directory cannot be created or the index
    /// database cannot be opened. Callers are expected to degrade to
    /// cache-disabled operation on failure rather than abort.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let blob_dir = dir.into();
        fs::create_dir_all(&blob_dir).map_err(|source| CacheError::CreateDir {
            path: blob_dir.clone(),
            source,
        })?;

        let index = TileIndex::open(&blob_dir.join(INDEX_FILE))?;
        debug!(dir = %blob_dir.display(), "Tile cache opened");

        Ok(Self { blob_dir, index })
    }

    /// Look up the raw bytes cached for a tile.
    ///
    /// Returns `None` when the index has no entry, and also when the index
    /// row exists but the referenced blob file is missing or unreadable.
    /// That inconsistency is logged as a diagnostic, never surfaced as an
    /// error: the caller simply sees a cache miss.
    pub fn lookup(&self, coord: TileCoord, scheme: &str) -> Option<Bytes> {
        let blob_name = match self.index.blob_name(coord, scheme) {
            Ok(Some(name)) => name,
            Ok(None) => return None,
            Err(e) => {
                warn!(%coord, scheme, error = %e, "Cache index lookup failed");
                return None;
            }
        };

        let path = self.blob_dir.join(&blob_name);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(%coord, scheme, blob = blob_name, "Cache hit");
                Some(Bytes::from(bytes))
            }
            Err(e) => {
                // Index row references a blob that is gone; treat as a miss
                warn!(
                    %coord,
                    scheme,
                    blob = blob_name,
                    error = %e,
                    "Cache index entry references missing blob"
                );
                None
            }
        }
    }

    /// Persist raw tile bytes and record them in the index.
    ///
    /// The blob name is derived from `source` (typically the tile URL) by
    /// stripping the scheme prefix and flattening path separators, so blobs
    /// never nest into subdirectories. The blob is written before the index
    /// row: a failed write leaves no index entry referencing an incomplete
    /// blob. An existing entry for the same key is overwritten.
    pub fn store(
        &self,
        coord: TileCoord,
        scheme: &str,
        bytes: &[u8],
        source: &str,
    ) -> Result<(), CacheError> {
        let blob_name = blob_name_from_source(source);
        let path = self.blob_dir.join(&blob_name);

        fs::write(&path, bytes).map_err(|source| CacheError::BlobWrite {
            name: blob_name.clone(),
            source,
        })?;

        self.index.insert(coord, scheme, &blob_name, bytes.len())?;
        debug!(%coord, scheme, blob = blob_name, size = bytes.len(), "Tile cached");
        Ok(())
    }

    /// Number of tiles recorded in the index.
    pub fn entry_count(&self) -> u64 {
        self.index.entry_count().unwrap_or(0)
    }

    /// Root directory holding the blobs and index.
    pub fn blob_dir(&self) -> &Path {
        &self.blob_dir
    }
}

/// Derives a flat, filesystem-safe blob name from a source identifier.
///
/// Strips a leading `http://` or `https://` (case-insensitive) and replaces
/// path separators with underscores so the name cannot escape the blob
/// directory or create nested paths.
pub fn blob_name_from_source(source: &str) -> String {
    let lower = source.to_ascii_lowercase();
    let stripped = if lower.starts_with("https://") {
        &source["https://".len()..]
    } else if lower.starts_with("http://") {
        &source["http://".len()..]
    } else {
        source
    };

    stripped.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp_cache() -> (TileCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = TileCache::open(dir.path()).unwrap();
        (cache, dir)
    }

    fn coord() -> TileCoord {
        TileCoord::new(2, 3, 4)
    }

    #[test]
    fn test_blob_name_strips_scheme_and_flattens() {
        assert_eq!(
            blob_name_from_source("http://tile.example.org/5/10/11.png"),
            "tile.example.org_5_10_11.png"
        );
        assert_eq!(
            blob_name_from_source("HTTPS://Tile.Example.org/5/10/11.png"),
            "Tile.Example.org_5_10_11.png"
        );
        assert_eq!(blob_name_from_source("offline"), "offline");
    }

    #[test]
    fn test_blob_name_has_no_path_separators() {
        let name = blob_name_from_source("https://a/b\\c/../d");
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
    }

    #[test]
    fn test_store_then_lookup_roundtrip() {
        let (cache, _dir) = open_temp_cache();
        let bytes = vec![7u8; 1024];

        cache
            .store(coord(), "osm", &bytes, "http://tile.example.org/2/3/4.png")
            .unwrap();

        let found = cache.lookup(coord(), "osm").expect("expected cache hit");
        assert_eq!(found.as_ref(), bytes.as_slice());
    }

    #[test]
    fn test_lookup_miss() {
        let (cache, _dir) = open_temp_cache();
        assert!(cache.lookup(coord(), "osm").is_none());
    }

    #[test]
    fn test_lookup_wrong_scheme_is_miss() {
        let (cache, _dir) = open_temp_cache();
        cache
            .store(coord(), "osm", b"data", "http://t/2/3/4.png")
            .unwrap();

        assert!(cache.lookup(coord(), "topo").is_none());
    }

    #[test]
    fn test_missing_blob_is_treated_as_miss() {
        let (cache, _dir) = open_temp_cache();
        cache
            .store(coord(), "osm", b"data", "http://t/2/3/4.png")
            .unwrap();

        // Delete the blob behind the index's back
        fs::remove_file(cache.blob_dir().join("t_2_3_4.png")).unwrap();

        assert!(cache.lookup(coord(), "osm").is_none());
    }

    #[test]
    fn test_store_overwrites_prior_entry() {
        let (cache, _dir) = open_temp_cache();
        cache
            .store(coord(), "osm", b"old", "http://t/2/3/4.png")
            .unwrap();
        cache
            .store(coord(), "osm", b"new", "http://t/2/3/4.png")
            .unwrap();

        let found = cache.lookup(coord(), "osm").unwrap();
        assert_eq!(found.as_ref(), b"new");
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let cache = TileCache::open(dir.path()).unwrap();
            cache
                .store(coord(), "osm", b"persisted", "http://t/2/3/4.png")
                .unwrap();
        }

        let cache = TileCache::open(dir.path()).unwrap();
        let found = cache.lookup(coord(), "osm").unwrap();
        assert_eq!(found.as_ref(), b"persisted");
    }

    #[test]
    fn test_open_on_unwritable_path_fails() {
        // A file standing where the cache directory should be
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"").unwrap();

        assert!(TileCache::open(&blocker).is_err());
    }
}
