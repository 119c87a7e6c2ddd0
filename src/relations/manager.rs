//! Relation writer: the four mutating relation operations.
//!
//! Each operation is a short sequence of independent store calls (validate,
//! write the link, propagate to the reverse cache). A failure part-way leaves
//! the earlier steps in place; the repair job is what restores the caches.

use super::error::RelationError;
use super::sync::{propagate, SyncKind, SyncOp};
use crate::catalog_store::{
    AlbumLinkUpsert, AlbumRecord, ArtistLinkUpsert, CatalogStore, InstrumentAlbumLink,
    InstrumentArtistLink, InstrumentRelations,
};
use crate::notifications::{CatalogChange, CatalogChangeKind, ChangeNotifier};
use crate::server::metrics;
use crate::user::{Actor, Permission};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const ARTIST_NOT_FOUND: &str = "Artist not found in metadata";
pub const ALBUM_NOT_FOUND: &str = "Album not found";
pub const RELATION_INSTRUMENT_MISMATCH: &str = "Relation belongs to another instrument";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArtistRelationDetails {
    #[serde(default)]
    pub years_used: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AlbumRelationDetails {
    #[serde(default)]
    pub notes: Option<String>,
}

/// What an album relation write produced.
#[derive(Debug, Clone)]
pub struct AlbumRelationResult {
    pub link: InstrumentAlbumLink,
    /// The artist link for the album's credited artist, when one was resolved.
    pub artist_link: Option<InstrumentArtistLink>,
}

pub struct RelationManager {
    store: Arc<dyn CatalogStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

fn automated_notes(album: &AlbumRecord) -> String {
    format!("Automated from album: {}", album.title)
}

fn record<T>(kind: SyncKind, op: SyncOp, result: &Result<T, RelationError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.label(),
    };
    metrics::record_relation_operation(kind.as_str(), op.as_str(), outcome);
}

impl RelationManager {
    pub fn new(store: Arc<dyn CatalogStore>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    fn check_can_edit(actor: &Actor, instrument_id: &str) -> Result<(), RelationError> {
        if !actor.has_permission(Permission::EditCatalog) {
            warn!(
                "User {} ({}) is not allowed to edit instrument relations",
                actor.user,
                actor.role.as_str()
            );
            return Err(RelationError::Unauthorized);
        }
        if instrument_id.trim().is_empty() {
            return Err(RelationError::InvalidRequest(
                "Instrument id is required".to_string(),
            ));
        }
        Ok(())
    }

    fn notify(&self, kind: CatalogChangeKind, instrument_id: &str, target_id: &str) {
        self.notifier.notify(CatalogChange {
            kind,
            instrument_id: instrument_id.to_string(),
            target_id: target_id.to_string(),
        });
    }

    // =========================================================================
    // Artist Relations
    // =========================================================================

    /// Link an instrument to the artist with slug `artist_key`.
    ///
    /// Writing the same pair again updates the existing link in place.
    pub fn add_artist_relation(
        &self,
        actor: &Actor,
        instrument_id: &str,
        artist_key: &str,
        details: ArtistRelationDetails,
    ) -> Result<InstrumentArtistLink, RelationError> {
        let result = self.do_add_artist_relation(actor, instrument_id, artist_key, details);
        record(SyncKind::Artist, SyncOp::Add, &result);
        result
    }

    fn do_add_artist_relation(
        &self,
        actor: &Actor,
        instrument_id: &str,
        artist_key: &str,
        details: ArtistRelationDetails,
    ) -> Result<InstrumentArtistLink, RelationError> {
        Self::check_can_edit(actor, instrument_id)?;

        let artist = self
            .store
            .get_artist_by_slug(artist_key)?
            .ok_or_else(|| RelationError::NotFound(ARTIST_NOT_FOUND.to_string()))?;

        let link = self.store.upsert_artist_link(&ArtistLinkUpsert {
            instrument_id: instrument_id.to_string(),
            artist_id: artist.id.clone(),
            years_used: details.years_used,
            notes: details.notes,
            is_verified: actor.is_privileged(),
            created_by: actor.user.clone(),
        })?;

        propagate(
            self.store.as_ref(),
            SyncKind::Artist,
            SyncOp::Add,
            instrument_id,
            &artist.id,
        )?;

        info!(
            "{} linked instrument {} to artist {} ({})",
            actor.user, instrument_id, artist.id, artist.label
        );
        self.notify(CatalogChangeKind::ArtistRelationAdded, instrument_id, &artist.id);
        Ok(link)
    }

    /// Delete an artist link. Returns false when there was nothing to delete.
    pub fn remove_artist_relation(
        &self,
        actor: &Actor,
        relation_id: &str,
        instrument_id: &str,
    ) -> Result<bool, RelationError> {
        let result = self.do_remove_artist_relation(actor, relation_id, instrument_id);
        record(SyncKind::Artist, SyncOp::Remove, &result);
        result
    }

    fn do_remove_artist_relation(
        &self,
        actor: &Actor,
        relation_id: &str,
        instrument_id: &str,
    ) -> Result<bool, RelationError> {
        Self::check_can_edit(actor, instrument_id)?;

        let Some(link) = self.store.get_artist_link(relation_id)? else {
            debug!("Artist relation {} does not exist, nothing to remove", relation_id);
            return Ok(false);
        };
        if link.instrument_id != instrument_id {
            warn!(
                "Artist relation {} belongs to instrument {}, not {}",
                relation_id, link.instrument_id, instrument_id
            );
            return Err(RelationError::InvalidRequest(
                RELATION_INSTRUMENT_MISMATCH.to_string(),
            ));
        }

        if !self.store.delete_artist_link(relation_id)? {
            debug!("Artist relation {} was already removed", relation_id);
            return Ok(false);
        }

        propagate(
            self.store.as_ref(),
            SyncKind::Artist,
            SyncOp::Remove,
            instrument_id,
            &link.artist_id,
        )?;

        info!(
            "{} unlinked instrument {} from artist {}",
            actor.user, instrument_id, link.artist_id
        );
        self.notify(
            CatalogChangeKind::ArtistRelationRemoved,
            instrument_id,
            &link.artist_id,
        );
        Ok(true)
    }

    // =========================================================================
    // Album Relations
    // =========================================================================

    /// Link an instrument to an album.
    ///
    /// Versions are collapsed onto their master, so the link always targets
    /// `album.parent_id` when set. When the album's credited artist matches an
    /// artist label, the instrument is linked to that artist as well.
    pub fn add_album_relation(
        &self,
        actor: &Actor,
        instrument_id: &str,
        album_id: &str,
        details: AlbumRelationDetails,
    ) -> Result<AlbumRelationResult, RelationError> {
        let result = self.do_add_album_relation(actor, instrument_id, album_id, details);
        record(SyncKind::Album, SyncOp::Add, &result);
        result
    }

    fn do_add_album_relation(
        &self,
        actor: &Actor,
        instrument_id: &str,
        album_id: &str,
        details: AlbumRelationDetails,
    ) -> Result<AlbumRelationResult, RelationError> {
        Self::check_can_edit(actor, instrument_id)?;

        let album = self
            .store
            .get_album(album_id)?
            .ok_or_else(|| RelationError::NotFound(ALBUM_NOT_FOUND.to_string()))?;
        let target_album_id = album.relation_target_id().to_string();
        if target_album_id != album.id {
            debug!(
                "Album {} is a version of {}, linking the master",
                album.id, target_album_id
            );
            if self.store.get_album(&target_album_id)?.is_none() {
                warn!(
                    "Master {} of album {} does not exist",
                    target_album_id, album.id
                );
                return Err(RelationError::NotFound(ALBUM_NOT_FOUND.to_string()));
            }
        }

        let link = self.store.upsert_album_link(&AlbumLinkUpsert {
            instrument_id: instrument_id.to_string(),
            album_id: target_album_id.clone(),
            notes: details.notes,
            is_verified: actor.is_privileged(),
            created_by: actor.user.clone(),
        })?;

        propagate(
            self.store.as_ref(),
            SyncKind::Album,
            SyncOp::Add,
            instrument_id,
            &target_album_id,
        )?;

        info!(
            "{} linked instrument {} to album {}",
            actor.user, instrument_id, target_album_id
        );
        self.notify(
            CatalogChangeKind::AlbumRelationAdded,
            instrument_id,
            &target_album_id,
        );

        let artist_link = self.link_album_artist(instrument_id, &album)?;

        Ok(AlbumRelationResult { link, artist_link })
    }

    /// Derive an artist link from the album's free-text artist.
    ///
    /// No matching artist is a normal outcome. An existing link for the pair
    /// is updated in place and keeps its original `created_by`.
    fn link_album_artist(
        &self,
        instrument_id: &str,
        album: &AlbumRecord,
    ) -> Result<Option<InstrumentArtistLink>, RelationError> {
        if album.artist.trim().is_empty() {
            return Ok(None);
        }
        let Some(artist) = self.store.find_artist_by_label(&album.artist)? else {
            debug!("No artist labelled \"{}\" for album {}", album.artist, album.id);
            return Ok(None);
        };

        let link = self.store.upsert_artist_link(&ArtistLinkUpsert {
            instrument_id: instrument_id.to_string(),
            artist_id: artist.id.clone(),
            years_used: None,
            notes: Some(automated_notes(album)),
            is_verified: false,
            created_by: Actor::system().user,
        })?;

        let changed = propagate(
            self.store.as_ref(),
            SyncKind::Artist,
            SyncOp::Add,
            instrument_id,
            &artist.id,
        )?;
        if changed {
            info!(
                "Linked instrument {} to artist {} through album {}",
                instrument_id, artist.id, album.id
            );
            self.notify(CatalogChangeKind::ArtistRelationAdded, instrument_id, &artist.id);
        }
        Ok(Some(link))
    }

    /// Delete an album link. Artist links derived from the album are kept.
    pub fn remove_album_relation(
        &self,
        actor: &Actor,
        relation_id: &str,
        instrument_id: &str,
    ) -> Result<bool, RelationError> {
        let result = self.do_remove_album_relation(actor, relation_id, instrument_id);
        record(SyncKind::Album, SyncOp::Remove, &result);
        result
    }

    fn do_remove_album_relation(
        &self,
        actor: &Actor,
        relation_id: &str,
        instrument_id: &str,
    ) -> Result<bool, RelationError> {
        Self::check_can_edit(actor, instrument_id)?;

        let Some(link) = self.store.get_album_link(relation_id)? else {
            debug!("Album relation {} does not exist, nothing to remove", relation_id);
            return Ok(false);
        };
        if link.instrument_id != instrument_id {
            warn!(
                "Album relation {} belongs to instrument {}, not {}",
                relation_id, link.instrument_id, instrument_id
            );
            return Err(RelationError::InvalidRequest(
                RELATION_INSTRUMENT_MISMATCH.to_string(),
            ));
        }

        if !self.store.delete_album_link(relation_id)? {
            debug!("Album relation {} was already removed", relation_id);
            return Ok(false);
        }

        propagate(
            self.store.as_ref(),
            SyncKind::Album,
            SyncOp::Remove,
            instrument_id,
            &link.album_id,
        )?;

        info!(
            "{} unlinked instrument {} from album {}",
            actor.user, instrument_id, link.album_id
        );
        self.notify(
            CatalogChangeKind::AlbumRelationRemoved,
            instrument_id,
            &link.album_id,
        );
        Ok(true)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn relations_for_instrument(
        &self,
        instrument_id: &str,
    ) -> Result<InstrumentRelations, RelationError> {
        Ok(InstrumentRelations {
            instrument_id: instrument_id.to_string(),
            artists: self.store.list_artist_links_for_instrument(instrument_id)?,
            albums: self.store.list_album_links_for_instrument(instrument_id)?,
        })
    }
}
