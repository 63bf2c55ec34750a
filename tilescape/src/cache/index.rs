//! SQLite metadata index for cached tiles.
//!
//! One row per `(scheme, x, y, zoom)` primary key, referencing the blob
//! file that holds the raw encoded tile. All access goes through
//! parameterized statements.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::cache::types::CacheError;
use crate::coord::TileCoord;

/// Schema for the tiles table. `type` is reserved for a future content-type
/// column and is not currently populated.
const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tiles_cache (
    scheme TEXT NOT NULL,
    x INTEGER NOT NULL,
    y INTEGER NOT NULL,
    zoom INTEGER NOT NULL,
    blob_name TEXT,
    created_at TEXT NOT NULL,
    created_at_epoch INTEGER NOT NULL,
    type TEXT,
    size_bytes INTEGER,
    PRIMARY KEY (scheme, x, y, zoom)
)";

/// Metadata index mapping tile identity to blob filename and bookkeeping.
pub struct TileIndex {
    conn: Mutex<Connection>,
}

impl TileIndex {
    /// Open (creating if absent) the index database at `path` and ensure
    /// the schema exists. Idempotent.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        conn.execute(CREATE_TABLE, [])?;
        debug!(path = %path.display(), "Tile index opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory index. Used in tests.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert or replace the index row for a tile.
    ///
    /// Last write wins: a prior entry for the same `(scheme, x, y, zoom)`
    /// key is overwritten.
    pub fn insert(
        &self,
        coord: TileCoord,
        scheme: &str,
        blob_name: &str,
        size_bytes: usize,
    ) -> Result<(), CacheError> {
        let now = chrono::Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO tiles_cache
                 (scheme, x, y, zoom, blob_name, created_at, created_at_epoch, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                scheme,
                coord.x,
                coord.y,
                coord.zoom,
                blob_name,
                now.to_rfc3339(),
                now.timestamp(),
                size_bytes as i64,
            ),
        )?;
        Ok(())
    }

    /// Look up the blob filename for a tile, if an entry exists.
    pub fn blob_name(&self, coord: TileCoord, scheme: &str) -> Result<Option<String>, CacheError> {
        let conn = self.conn.lock();
        let name = conn
            .query_row(
                "SELECT blob_name FROM tiles_cache
                 WHERE scheme = ?1 AND x = ?2 AND y = ?3 AND zoom = ?4",
                (scheme, coord.x, coord.y, coord.zoom),
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    /// Number of entries in the index.
    pub fn entry_count(&self) -> Result<u64, CacheError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tiles_cache", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_coord() -> TileCoord {
        TileCoord::new(5, 10, 11)
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cache.db");

        let first = TileIndex::open(&path).unwrap();
        first.insert(test_coord(), "osm", "blob.png", 42).unwrap();
        drop(first);

        // Reopening must not lose data or fail on the existing schema
        let second = TileIndex::open(&path).unwrap();
        assert_eq!(
            second.blob_name(test_coord(), "osm").unwrap(),
            Some("blob.png".to_string())
        );
    }

    #[test]
    fn test_missing_entry_is_none() {
        let index = TileIndex::open_in_memory().unwrap();
        assert_eq!(index.blob_name(test_coord(), "osm").unwrap(), None);
    }

    #[test]
    fn test_insert_and_lookup() {
        let index = TileIndex::open_in_memory().unwrap();
        index
            .insert(test_coord(), "osm", "osm_5_10_11.png", 1024)
            .unwrap();

        assert_eq!(
            index.blob_name(test_coord(), "osm").unwrap(),
            Some("osm_5_10_11.png".to_string())
        );
    }

    #[test]
    fn test_scheme_namespacing() {
        let index = TileIndex::open_in_memory().unwrap();
        index.insert(test_coord(), "osm", "osm.png", 1).unwrap();
        index.insert(test_coord(), "topo", "topo.png", 1).unwrap();

        assert_eq!(
            index.blob_name(test_coord(), "osm").unwrap(),
            Some("osm.png".to_string())
        );
        assert_eq!(
            index.blob_name(test_coord(), "topo").unwrap(),
            Some("topo.png".to_string())
        );
        assert_eq!(index.entry_count().unwrap(), 2);
    }

    #[test]
    fn test_last_write_wins() {
        let index = TileIndex::open_in_memory().unwrap();
        index.insert(test_coord(), "osm", "old.png", 1).unwrap();
        index.insert(test_coord(), "osm", "new.png", 2).unwrap();

        assert_eq!(
            index.blob_name(test_coord(), "osm").unwrap(),
            Some("new.png".to_string())
        );
        assert_eq!(index.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_name_injection_is_inert() {
        // Parameterized statements must treat hostile scheme names as data
        let index = TileIndex::open_in_memory().unwrap();
        let scheme = "x'; DROP TABLE tiles_cache; --";
        index.insert(test_coord(), scheme, "blob.png", 1).unwrap();

        assert_eq!(
            index.blob_name(test_coord(), scheme).unwrap(),
            Some("blob.png".to_string())
        );
        assert_eq!(index.entry_count().unwrap(), 1);
    }
}
