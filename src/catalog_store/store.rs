//! SQLite-backed catalog store.
//!
//! Writes go through a single connection; reads are spread over a small pool
//! of read-only connections. Every trait method touches exactly one document,
//! so holding the write lock for the duration of a call is what makes the
//! reverse-cache set operations atomic.

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, types::Type, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

pub const DEFAULT_READ_POOL_SIZE: usize = 4;

const ARTIST_COLUMNS: &str = "id, slug, label, instruments";
const ALBUM_COLUMNS: &str = "id, title, artist, parent_id, is_master, instruments, artist_refs";
const ARTIST_LINK_COLUMNS: &str =
    "id, instrument_id, artist_id, years_used, notes, is_verified, created_by, created_at, updated_at";
const ALBUM_LINK_COLUMNS: &str =
    "id, instrument_id, album_id, notes, is_verified, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Catalog db has user_version {}, which was not written by this server",
            db_version
        );
    }
    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
            }
            current_version = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Catalog db schema validation failed")
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow!("catalog db connection mutex poisoned"))
}

fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Lowercased label, used as the case-insensitive match key.
fn label_key(label: &str) -> String {
    label.to_lowercase()
}

fn parse_id_set(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn encode_id_set(ids: &[String]) -> Result<String> {
    serde_json::to_string(ids).context("Failed to encode reverse cache")
}

impl SqliteCatalogStore {
    /// Open (or create) the catalog database at `db_path`.
    ///
    /// `read_pool_size` read-only connections are opened next to the write
    /// connection; at least one is always opened.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open catalog database at {:?}", db_path))?;

        write_conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        write_conn.busy_timeout(std::time::Duration::from_secs(5))?;
        migrate_if_needed(&mut write_conn)?;

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.busy_timeout(std::time::Duration::from_secs(5))?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        let store = SqliteCatalogStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        };

        info!(
            "Opened catalog: {} artists, {} albums, {} artist links, {} album links",
            store.get_artists_count(),
            store.get_albums_count(),
            store.get_artist_links_count(),
            store.get_album_links_count()
        );

        Ok(store)
    }

    fn read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn count(&self, table: &str) -> usize {
        let conn = self.read_conn();
        let Ok(conn) = lock(&conn) else {
            return 0;
        };
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }

    // =========================================================================
    // Row Parsing
    // =========================================================================

    fn parse_artist_row(row: &Row) -> rusqlite::Result<ArtistRecord> {
        Ok(ArtistRecord {
            id: row.get(0)?,
            slug: row.get(1)?,
            label: row.get(2)?,
            instruments: parse_id_set(row, 3)?,
        })
    }

    fn parse_album_row(row: &Row) -> rusqlite::Result<AlbumRecord> {
        Ok(AlbumRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            artist: row.get(2)?,
            parent_id: row.get(3)?,
            is_master: row.get::<_, i64>(4)? != 0,
            instruments: parse_id_set(row, 5)?,
            artist_refs: parse_id_set(row, 6)?,
        })
    }

    fn parse_artist_link_row(row: &Row) -> rusqlite::Result<InstrumentArtistLink> {
        Ok(InstrumentArtistLink {
            id: row.get(0)?,
            instrument_id: row.get(1)?,
            artist_id: row.get(2)?,
            years_used: row.get(3)?,
            notes: row.get(4)?,
            is_verified: row.get::<_, i64>(5)? != 0,
            created_by: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn parse_album_link_row(row: &Row) -> rusqlite::Result<InstrumentAlbumLink> {
        Ok(InstrumentAlbumLink {
            id: row.get(0)?,
            instrument_id: row.get(1)?,
            album_id: row.get(2)?,
            notes: row.get(3)?,
            is_verified: row.get::<_, i64>(4)? != 0,
            created_by: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn query_one<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        parse: fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        let conn = self.read_conn();
        let conn = lock(&conn)?;
        Ok(conn.query_row(sql, params, parse).optional()?)
    }

    fn query_all<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        parse: fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.read_conn();
        let conn = lock(&conn)?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, parse)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    /// Read-modify-write of one reverse cache inside a single transaction.
    fn mutate_reverse_cache<F>(&self, cache: ReverseCache, target_id: &str, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<String>),
    {
        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;

        let select_sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            cache.column(),
            cache.table()
        );
        let raw: Option<String> = tx
            .query_row(&select_sql, params![target_id], |r| r.get(0))
            .optional()?;
        let Some(raw) = raw else {
            bail!("Cannot update {}: {} not found", cache, target_id);
        };

        let mut ids: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed {} for {}", cache, target_id))?;
        let before = ids.clone();
        mutate(&mut ids);
        if ids == before {
            return Ok(false);
        }

        let update_sql = format!(
            "UPDATE {} SET {} = ?1 WHERE id = ?2",
            cache.table(),
            cache.column()
        );
        tx.execute(&update_sql, params![encode_id_set(&ids)?, target_id])?;
        tx.commit()?;
        debug!("Updated {} for {}: {:?}", cache, target_id, ids);
        Ok(true)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get_artist(&self, id: &str) -> Result<Option<ArtistRecord>> {
        self.query_one(
            &format!("SELECT {} FROM artists WHERE id = ?1", ARTIST_COLUMNS),
            params![id],
            Self::parse_artist_row,
        )
    }

    fn get_artist_by_slug(&self, slug: &str) -> Result<Option<ArtistRecord>> {
        self.query_one(
            &format!("SELECT {} FROM artists WHERE slug = ?1", ARTIST_COLUMNS),
            params![slug],
            Self::parse_artist_row,
        )
    }

    fn find_artist_by_label(&self, label: &str) -> Result<Option<ArtistRecord>> {
        self.query_one(
            &format!(
                "SELECT {} FROM artists WHERE label_key = ?1 ORDER BY id LIMIT 1",
                ARTIST_COLUMNS
            ),
            params![label_key(label)],
            Self::parse_artist_row,
        )
    }

    fn get_album(&self, id: &str) -> Result<Option<AlbumRecord>> {
        self.query_one(
            &format!("SELECT {} FROM albums WHERE id = ?1", ALBUM_COLUMNS),
            params![id],
            Self::parse_album_row,
        )
    }

    fn list_albums_with_artist(&self) -> Result<Vec<AlbumRecord>> {
        self.query_all(
            &format!(
                "SELECT {} FROM albums WHERE trim(artist) != '' ORDER BY id",
                ALBUM_COLUMNS
            ),
            [],
            Self::parse_album_row,
        )
    }

    fn insert_artist(&self, artist: &ArtistRecord) -> Result<()> {
        let conn = lock(&self.write_conn)?;
        conn.execute(
            "INSERT INTO artists (id, slug, label, label_key, instruments) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                artist.id,
                artist.slug,
                artist.label,
                label_key(&artist.label),
                encode_id_set(&artist.instruments)?
            ],
        )
        .with_context(|| format!("Failed to insert artist {}", artist.id))?;
        Ok(())
    }

    fn insert_album(&self, album: &AlbumRecord) -> Result<()> {
        let conn = lock(&self.write_conn)?;
        conn.execute(
            "INSERT INTO albums (id, title, artist, parent_id, is_master, instruments, artist_refs)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                album.id,
                album.title,
                album.artist,
                album.parent_id,
                album.is_master as i64,
                encode_id_set(&album.instruments)?,
                encode_id_set(&album.artist_refs)?
            ],
        )
        .with_context(|| format!("Failed to insert album {}", album.id))?;
        Ok(())
    }

    fn upsert_artist_link(&self, link: &ArtistLinkUpsert) -> Result<InstrumentArtistLink> {
        let conn = lock(&self.write_conn)?;
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO instrument_artist_links
                (id, instrument_id, artist_id, years_used, notes, is_verified, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(instrument_id, artist_id) DO UPDATE SET
                years_used = excluded.years_used,
                notes = excluded.notes,
                is_verified = excluded.is_verified,
                updated_at = excluded.updated_at",
            params![
                uuid::Uuid::new_v4().to_string(),
                link.instrument_id,
                link.artist_id,
                link.years_used,
                link.notes,
                link.is_verified as i64,
                link.created_by,
                now
            ],
        )?;
        let stored = conn.query_row(
            &format!(
                "SELECT {} FROM instrument_artist_links WHERE instrument_id = ?1 AND artist_id = ?2",
                ARTIST_LINK_COLUMNS
            ),
            params![link.instrument_id, link.artist_id],
            Self::parse_artist_link_row,
        )?;
        Ok(stored)
    }

    fn get_artist_link(&self, id: &str) -> Result<Option<InstrumentArtistLink>> {
        self.query_one(
            &format!(
                "SELECT {} FROM instrument_artist_links WHERE id = ?1",
                ARTIST_LINK_COLUMNS
            ),
            params![id],
            Self::parse_artist_link_row,
        )
    }

    fn find_artist_link(
        &self,
        instrument_id: &str,
        artist_id: &str,
    ) -> Result<Option<InstrumentArtistLink>> {
        self.query_one(
            &format!(
                "SELECT {} FROM instrument_artist_links WHERE instrument_id = ?1 AND artist_id = ?2",
                ARTIST_LINK_COLUMNS
            ),
            params![instrument_id, artist_id],
            Self::parse_artist_link_row,
        )
    }

    fn delete_artist_link(&self, id: &str) -> Result<bool> {
        let conn = lock(&self.write_conn)?;
        let deleted = conn.execute(
            "DELETE FROM instrument_artist_links WHERE id = ?1",
            params![id],
        )?;
        Ok(deleted > 0)
    }

    fn list_artist_links(&self) -> Result<Vec<InstrumentArtistLink>> {
        self.query_all(
            &format!(
                "SELECT {} FROM instrument_artist_links ORDER BY artist_id, instrument_id",
                ARTIST_LINK_COLUMNS
            ),
            [],
            Self::parse_artist_link_row,
        )
    }

    fn list_artist_links_for_instrument(
        &self,
        instrument_id: &str,
    ) -> Result<Vec<InstrumentArtistLink>> {
        self.query_all(
            &format!(
                "SELECT {} FROM instrument_artist_links WHERE instrument_id = ?1 ORDER BY created_at, id",
                ARTIST_LINK_COLUMNS
            ),
            params![instrument_id],
            Self::parse_artist_link_row,
        )
    }

    fn upsert_album_link(&self, link: &AlbumLinkUpsert) -> Result<InstrumentAlbumLink> {
        let conn = lock(&self.write_conn)?;
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO instrument_album_links
                (id, instrument_id, album_id, notes, is_verified, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(instrument_id, album_id) DO UPDATE SET
                notes = excluded.notes,
                is_verified = excluded.is_verified,
                updated_at = excluded.updated_at",
            params![
                uuid::Uuid::new_v4().to_string(),
                link.instrument_id,
                link.album_id,
                link.notes,
                link.is_verified as i64,
                link.created_by,
                now
            ],
        )?;
        let stored = conn.query_row(
            &format!(
                "SELECT {} FROM instrument_album_links WHERE instrument_id = ?1 AND album_id = ?2",
                ALBUM_LINK_COLUMNS
            ),
            params![link.instrument_id, link.album_id],
            Self::parse_album_link_row,
        )?;
        Ok(stored)
    }

    fn get_album_link(&self, id: &str) -> Result<Option<InstrumentAlbumLink>> {
        self.query_one(
            &format!(
                "SELECT {} FROM instrument_album_links WHERE id = ?1",
                ALBUM_LINK_COLUMNS
            ),
            params![id],
            Self::parse_album_link_row,
        )
    }

    fn delete_album_link(&self, id: &str) -> Result<bool> {
        let conn = lock(&self.write_conn)?;
        let deleted = conn.execute(
            "DELETE FROM instrument_album_links WHERE id = ?1",
            params![id],
        )?;
        Ok(deleted > 0)
    }

    fn list_album_links(&self) -> Result<Vec<InstrumentAlbumLink>> {
        self.query_all(
            &format!(
                "SELECT {} FROM instrument_album_links ORDER BY album_id, instrument_id",
                ALBUM_LINK_COLUMNS
            ),
            [],
            Self::parse_album_link_row,
        )
    }

    fn list_album_links_for_instrument(
        &self,
        instrument_id: &str,
    ) -> Result<Vec<InstrumentAlbumLink>> {
        self.query_all(
            &format!(
                "SELECT {} FROM instrument_album_links WHERE instrument_id = ?1 ORDER BY created_at, id",
                ALBUM_LINK_COLUMNS
            ),
            params![instrument_id],
            Self::parse_album_link_row,
        )
    }

    fn add_to_reverse_cache(
        &self,
        cache: ReverseCache,
        target_id: &str,
        value: &str,
    ) -> Result<bool> {
        self.mutate_reverse_cache(cache, target_id, |ids| {
            if !ids.iter().any(|id| id == value) {
                ids.push(value.to_string());
            }
        })
    }

    fn remove_from_reverse_cache(
        &self,
        cache: ReverseCache,
        target_id: &str,
        value: &str,
    ) -> Result<bool> {
        self.mutate_reverse_cache(cache, target_id, |ids| ids.retain(|id| id != value))
    }

    fn replace_reverse_cache(
        &self,
        cache: ReverseCache,
        target_id: &str,
        values: &[String],
    ) -> Result<bool> {
        let mut replacement = values.to_vec();
        replacement.sort();
        replacement.dedup();
        self.mutate_reverse_cache(cache, target_id, move |ids| *ids = replacement)
    }

    fn get_artists_count(&self) -> usize {
        self.count("artists")
    }

    fn get_albums_count(&self) -> usize {
        self.count("albums")
    }

    fn get_artist_links_count(&self) -> usize {
        self.count("instrument_artist_links")
    }

    fn get_album_links_count(&self) -> usize {
        self.count("instrument_album_links")
    }
}
