//! SQLite store for the destination catalog.
//!
//! Append-only writes, one transaction per table. No transaction spans two
//! tables, so a failed append never rolls back an earlier table's rows.

use super::models::{
    AlbumRecord, ArtistAlbumRow, ArtistGenreRow, ArtistRecord, ArtistTrackRow, EntityTable,
    TrackAlbumRow, TrackRecord,
};
use super::schema::CATALOG_SCHEMA_SQL;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Trait for catalog storage operations used by the pipeline.
pub trait CatalogStore: Send + Sync {
    // ==================== Reads ====================

    /// All primary keys currently present in an entity table.
    fn existing_ids(&self, table: EntityTable) -> Result<HashSet<String>>;

    /// Current row count of an entity table.
    fn count_rows(&self, table: EntityTable) -> Result<u64>;

    // ==================== Appends ====================
    //
    // Each append returns the number of rows written.

    fn append_artists(&self, records: &[ArtistRecord]) -> Result<usize>;

    fn append_albums(&self, records: &[AlbumRecord]) -> Result<usize>;

    fn append_tracks(&self, records: &[TrackRecord]) -> Result<usize>;

    fn append_artist_genres(&self, rows: &[ArtistGenreRow]) -> Result<usize>;

    fn append_artist_tracks(&self, rows: &[ArtistTrackRow]) -> Result<usize>;

    fn append_artist_albums(&self, rows: &[ArtistAlbumRow]) -> Result<usize>;

    fn append_track_albums(&self, rows: &[TrackAlbumRow]) -> Result<usize>;
}

/// SQLite implementation of [`CatalogStore`].
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Open or create a catalog database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog database: {:?}", path))?;
        Self::init(conn)
    }

    /// In-memory catalog, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory catalog")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(CATALOG_SCHEMA_SQL)
            .context("Failed to create catalog schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn existing_ids(&self, table: EntityTable) -> Result<HashSet<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("SELECT id FROM {}", table.table_name()))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()
            .with_context(|| format!("Failed to read ids from {}", table.table_name()))?;
        Ok(ids)
    }

    fn count_rows(&self, table: EntityTable) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn append_artists(&self, records: &[ArtistRecord]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO artist (id, name, url, image_640_url, image_320_url, image_160_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for r in records {
                stmt.execute(params![
                    r.id,
                    r.name,
                    r.url,
                    r.image_640_url,
                    r.image_320_url,
                    r.image_160_url,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn append_albums(&self, records: &[AlbumRecord]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO album (id, name, release_date, url, total_tracks, album_type,
                                    image_640_url, image_300_url, image_64_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for r in records {
                stmt.execute(params![
                    r.id,
                    r.name,
                    r.release_date,
                    r.url,
                    r.total_tracks,
                    r.album_type,
                    r.image_640_url,
                    r.image_300_url,
                    r.image_64_url,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn append_tracks(&self, records: &[TrackRecord]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO track (id, name, url, duration_ms, release_date, is_single, explicit)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for r in records {
                stmt.execute(params![
                    r.id,
                    r.name,
                    r.url,
                    r.duration_ms as i64,
                    r.release_date,
                    r.is_single,
                    r.explicit,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn append_artist_genres(&self, rows: &[ArtistGenreRow]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO artist_genre (artist_id, genre) VALUES (?1, ?2)")?;
            for r in rows {
                stmt.execute(params![r.artist_id, r.genre])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn append_artist_tracks(&self, rows: &[ArtistTrackRow]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx
                .prepare_cached("INSERT INTO artist_track (artist_id, track_id) VALUES (?1, ?2)")?;
            for r in rows {
                stmt.execute(params![r.artist_id, r.track_id])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn append_artist_albums(&self, rows: &[ArtistAlbumRow]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx
                .prepare_cached("INSERT INTO artist_album (artist_id, album_id) VALUES (?1, ?2)")?;
            for r in rows {
                stmt.execute(params![r.artist_id, r.album_id])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn append_track_albums(&self, rows: &[TrackAlbumRow]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO track_album (track_id, album_id) VALUES (?1, ?2)")?;
            for r in rows {
                stmt.execute(params![r.track_id, r.album_id])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}
