//! CatalogStore trait definition.
//!
//! The store is used as a generic document store: identifier-keyed lookups,
//! filtered scans, insert-or-update by unique key, delete by id, and atomic
//! set-append/set-remove on a single record's reverse cache. Nothing here spans
//! more than one document; multi-document consistency is the caller's concern.

use super::models::*;
use anyhow::Result;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Canonical Entities
    // =========================================================================

    /// Get an artist by id.
    fn get_artist(&self, id: &str) -> Result<Option<ArtistRecord>>;

    /// Get an artist by its unique lookup key.
    fn get_artist_by_slug(&self, slug: &str) -> Result<Option<ArtistRecord>>;

    /// Find the artist whose label matches `label` exactly, ignoring case.
    /// When several artists share a label the one with the lowest id wins.
    fn find_artist_by_label(&self, label: &str) -> Result<Option<ArtistRecord>>;

    /// Get an album by id.
    fn get_album(&self, id: &str) -> Result<Option<AlbumRecord>>;

    /// List all albums with a non-empty free-text artist.
    fn list_albums_with_artist(&self) -> Result<Vec<AlbumRecord>>;

    /// Insert a new artist record. Fails if the id or slug already exists.
    fn insert_artist(&self, artist: &ArtistRecord) -> Result<()>;

    /// Insert a new album record. Fails if the id already exists.
    fn insert_album(&self, album: &AlbumRecord) -> Result<()>;

    // =========================================================================
    // Instrument <-> Artist Links
    // =========================================================================

    /// Insert or update the link keyed by (instrument_id, artist_id).
    /// Returns the link as stored after the write.
    fn upsert_artist_link(&self, link: &ArtistLinkUpsert) -> Result<InstrumentArtistLink>;

    fn get_artist_link(&self, id: &str) -> Result<Option<InstrumentArtistLink>>;

    fn find_artist_link(
        &self,
        instrument_id: &str,
        artist_id: &str,
    ) -> Result<Option<InstrumentArtistLink>>;

    /// Delete a link by id. Returns false if it did not exist.
    fn delete_artist_link(&self, id: &str) -> Result<bool>;

    fn list_artist_links(&self) -> Result<Vec<InstrumentArtistLink>>;

    fn list_artist_links_for_instrument(
        &self,
        instrument_id: &str,
    ) -> Result<Vec<InstrumentArtistLink>>;

    // =========================================================================
    // Instrument <-> Album Links
    // =========================================================================

    /// Insert or update the link keyed by (instrument_id, album_id).
    /// Returns the link as stored after the write.
    fn upsert_album_link(&self, link: &AlbumLinkUpsert) -> Result<InstrumentAlbumLink>;

    fn get_album_link(&self, id: &str) -> Result<Option<InstrumentAlbumLink>>;

    /// Delete a link by id. Returns false if it did not exist.
    fn delete_album_link(&self, id: &str) -> Result<bool>;

    fn list_album_links(&self) -> Result<Vec<InstrumentAlbumLink>>;

    fn list_album_links_for_instrument(
        &self,
        instrument_id: &str,
    ) -> Result<Vec<InstrumentAlbumLink>>;

    // =========================================================================
    // Reverse Caches
    // =========================================================================

    /// Append `value` to the cache of `target_id` unless already present.
    /// Returns whether the cache changed. Errors if the target does not exist.
    fn add_to_reverse_cache(&self, cache: ReverseCache, target_id: &str, value: &str)
        -> Result<bool>;

    /// Remove every occurrence of `value` from the cache of `target_id`.
    /// Returns whether the cache changed. Errors if the target does not exist.
    fn remove_from_reverse_cache(
        &self,
        cache: ReverseCache,
        target_id: &str,
        value: &str,
    ) -> Result<bool>;

    /// Replace the cache of `target_id` with `values`, deduplicated and sorted.
    /// Returns whether the cache changed. Errors if the target does not exist.
    fn replace_reverse_cache(
        &self,
        cache: ReverseCache,
        target_id: &str,
        values: &[String],
    ) -> Result<bool>;

    // =========================================================================
    // Counts (for metrics)
    // =========================================================================

    fn get_artists_count(&self) -> usize;

    fn get_albums_count(&self) -> usize;

    fn get_artist_links_count(&self) -> usize;

    fn get_album_links_count(&self) -> usize;
}
