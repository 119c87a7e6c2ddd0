//! Catalog models: canonical artist/album records and the instrument link records.

use serde::{Deserialize, Serialize};

// =============================================================================
// Canonical Entities
// =============================================================================

/// Canonical artist record.
///
/// `instruments` is a reverse cache of instrument ids with at least one link to
/// this artist. It is derived data; `instrument_artist_links` is authoritative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub id: String,
    /// Unique lookup key
    pub slug: String,
    /// Display label
    pub label: String,
    #[serde(default)]
    pub instruments: Vec<String>,
}

/// Canonical album record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub id: String,
    pub title: String,
    /// Free-text artist name as imported
    pub artist: String,
    /// Set when this album is a version of a master album
    pub parent_id: Option<String>,
    pub is_master: bool,
    #[serde(default)]
    pub instruments: Vec<String>,
    /// Artist record ids resolved from the free-text `artist`
    #[serde(default)]
    pub artist_refs: Vec<String>,
}

impl AlbumRecord {
    /// The album id relations must be stored against: the parent for versions,
    /// the album itself for masters and standalone albums.
    pub fn relation_target_id(&self) -> &str {
        self.parent_id.as_deref().unwrap_or(&self.id)
    }
}

// =============================================================================
// Link Records
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentArtistLink {
    pub id: String,
    pub instrument_id: String,
    pub artist_id: String,
    pub years_used: Option<String>,
    pub notes: Option<String>,
    pub is_verified: bool,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentAlbumLink {
    pub id: String,
    pub instrument_id: String,
    /// Always a master or standalone album
    pub album_id: String,
    pub notes: Option<String>,
    pub is_verified: bool,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Insert-or-update payload for an instrument/artist link, keyed by the pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistLinkUpsert {
    pub instrument_id: String,
    pub artist_id: String,
    pub years_used: Option<String>,
    pub notes: Option<String>,
    pub is_verified: bool,
    pub created_by: String,
}

/// Insert-or-update payload for an instrument/album link, keyed by the pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumLinkUpsert {
    pub instrument_id: String,
    pub album_id: String,
    pub notes: Option<String>,
    pub is_verified: bool,
    pub created_by: String,
}

/// All links attached to one instrument.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InstrumentRelations {
    pub instrument_id: String,
    pub artists: Vec<InstrumentArtistLink>,
    pub albums: Vec<InstrumentAlbumLink>,
}

// =============================================================================
// Reverse Caches
// =============================================================================

/// A denormalized set-valued field on a canonical record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReverseCache {
    /// `artists.instruments`
    ArtistInstruments,
    /// `albums.instruments`
    AlbumInstruments,
    /// `albums.artist_refs`
    AlbumArtistRefs,
}

impl ReverseCache {
    pub(super) fn table(&self) -> &'static str {
        match self {
            ReverseCache::ArtistInstruments => "artists",
            ReverseCache::AlbumInstruments | ReverseCache::AlbumArtistRefs => "albums",
        }
    }

    pub(super) fn column(&self) -> &'static str {
        match self {
            ReverseCache::ArtistInstruments | ReverseCache::AlbumInstruments => "instruments",
            ReverseCache::AlbumArtistRefs => "artist_refs",
        }
    }
}

impl std::fmt::Display for ReverseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table(), self.column())
    }
}
