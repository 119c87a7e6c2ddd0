use super::rebuild::rebuild_reverse_caches;
use crate::catalog_store::{CatalogStore, ReverseCache};
use crate::server::metrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a repair run.
///
/// `success` is false only when the link tables could not be read at all;
/// per-entity failures are listed in `errors` and do not stop the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    pub success: bool,
    pub artists_updated: usize,
    pub albums_updated: usize,
    pub artist_refs_updated: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
struct Tally {
    succeeded: usize,
    failed: usize,
}

fn replace_all(
    store: &dyn CatalogStore,
    cache: ReverseCache,
    rebuilt: &BTreeMap<String, Vec<String>>,
    errors: &mut Vec<String>,
) -> Tally {
    let mut tally = Tally::default();
    for (target_id, instruments) in rebuilt {
        match store.replace_reverse_cache(cache, target_id, instruments) {
            Ok(changed) => {
                if changed {
                    debug!("Rebuilt {} for {}", cache, target_id);
                }
                tally.succeeded += 1;
            }
            Err(e) => {
                warn!("Failed to rebuild {} for {}: {:#}", cache, target_id, e);
                errors.push(format!("{} {}: {:#}", cache, target_id, e));
                tally.failed += 1;
            }
        }
    }
    tally
}

fn resolve_artist_refs(store: &dyn CatalogStore, errors: &mut Vec<String>) -> Tally {
    let mut tally = Tally::default();
    let albums = match store.list_albums_with_artist() {
        Ok(albums) => albums,
        Err(e) => {
            warn!("Failed to list albums for artist resolution: {:#}", e);
            errors.push(format!("albums: {:#}", e));
            tally.failed += 1;
            return tally;
        }
    };

    for album in albums {
        let result = store.find_artist_by_label(&album.artist).and_then(|artist| match artist {
            Some(artist) => store
                .add_to_reverse_cache(ReverseCache::AlbumArtistRefs, &album.id, &artist.id)
                .map(|_| true),
            None => Ok(false),
        });
        match result {
            Ok(true) => tally.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                warn!("Failed to resolve artist for album {}: {:#}", album.id, e);
                errors.push(format!("{} {}: {:#}", ReverseCache::AlbumArtistRefs, album.id, e));
                tally.failed += 1;
            }
        }
    }
    tally
}

/// Rebuild every reverse cache from the link tables.
///
/// 1. `artists.instruments` is replaced for every artist with at least one link.
/// 2. `albums.instruments` is replaced for every album with at least one link.
/// 3. Albums whose free-text artist matches an artist label get that artist
///    added to `artist_refs`.
///
/// Running it twice in a row leaves the store unchanged the second time.
pub fn run_repair(store: &dyn CatalogStore) -> RepairReport {
    let start = Instant::now();
    info!("Starting catalog cache repair");

    let artist_links = match store.list_artist_links() {
        Ok(links) => links,
        Err(e) => return aborted(format!("Failed to list artist links: {:#}", e), start),
    };
    let album_links = match store.list_album_links() {
        Ok(links) => links,
        Err(e) => return aborted(format!("Failed to list album links: {:#}", e), start),
    };
    let rebuilt = rebuild_reverse_caches(&artist_links, &album_links);

    let mut errors = Vec::new();
    let artists = replace_all(
        store,
        ReverseCache::ArtistInstruments,
        &rebuilt.artist_instruments,
        &mut errors,
    );
    info!(
        "Repair phase 1: {} artists rebuilt, {} failed",
        artists.succeeded, artists.failed
    );

    let albums = replace_all(
        store,
        ReverseCache::AlbumInstruments,
        &rebuilt.album_instruments,
        &mut errors,
    );
    info!(
        "Repair phase 2: {} albums rebuilt, {} failed",
        albums.succeeded, albums.failed
    );

    let artist_refs = resolve_artist_refs(store, &mut errors);
    info!(
        "Repair phase 3: {} album artists resolved, {} failed",
        artist_refs.succeeded, artist_refs.failed
    );

    let report = RepairReport {
        success: true,
        artists_updated: artists.succeeded,
        albums_updated: albums.succeeded,
        artist_refs_updated: artist_refs.succeeded,
        errors,
    };
    metrics::record_repair_run(&report, start.elapsed());
    info!(
        "Catalog cache repair finished in {:?} with {} errors",
        start.elapsed(),
        report.errors.len()
    );
    report
}

fn aborted(error: String, start: Instant) -> RepairReport {
    warn!("Catalog cache repair aborted: {}", error);
    let report = RepairReport {
        success: false,
        errors: vec![error],
        ..Default::default()
    };
    metrics::record_repair_run(&report, start.elapsed());
    report
}
