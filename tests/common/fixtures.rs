//! Test fixture creation
//!
//! Seeds a fresh catalog database in a temp dir. Reverse caches start empty.

use super::constants::*;
use anyhow::Result;
use instrument_catalog_server::catalog_store::{
    AlbumRecord, ArtistRecord, CatalogStore, SqliteCatalogStore,
};
use tempfile::TempDir;

fn artist(id: &str, slug: &str, label: &str) -> ArtistRecord {
    ArtistRecord {
        id: id.to_string(),
        slug: slug.to_string(),
        label: label.to_string(),
        instruments: vec![],
    }
}

fn album(id: &str, title: &str, artist: &str, parent_id: Option<&str>) -> AlbumRecord {
    AlbumRecord {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        parent_id: parent_id.map(str::to_string),
        is_master: parent_id.is_none(),
        instruments: vec![],
        artist_refs: vec![],
    }
}

/// Creates a temp dir holding a seeded `catalog.db` and returns the open store.
pub fn create_test_catalog() -> Result<(TempDir, SqliteCatalogStore)> {
    let dir = TempDir::new()?;
    let store = SqliteCatalogStore::new(dir.path().join("catalog.db"), 2)?;

    store.insert_artist(&artist(ARTIST_KRAFTWERK_ID, ARTIST_KRAFTWERK_SLUG, "Kraftwerk"))?;
    store.insert_artist(&artist(
        ARTIST_TANGERINE_ID,
        ARTIST_TANGERINE_SLUG,
        "Tangerine Dream",
    ))?;

    store.insert_album(&album(ALBUM_MASTER_ID, ALBUM_MASTER_TITLE, "kraftwerk", None))?;
    store.insert_album(&album(
        ALBUM_VERSION_ID,
        "Computer World (Remastered)",
        "Kraftwerk",
        Some(ALBUM_MASTER_ID),
    ))?;
    store.insert_album(&album(
        ALBUM_UNKNOWN_ARTIST_ID,
        "Field Recordings",
        "Nobody In Particular",
        None,
    ))?;

    Ok((dir, store))
}
