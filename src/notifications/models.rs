use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogChangeKind {
    ArtistRelationAdded,
    ArtistRelationRemoved,
    AlbumRelationAdded,
    AlbumRelationRemoved,
    CachesRepaired,
}

/// A change to the relations of one instrument.
///
/// `target_id` is the artist or album the relation points at. For
/// [`CatalogChangeKind::CachesRepaired`] both ids are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogChange {
    pub kind: CatalogChangeKind,
    pub instrument_id: String,
    pub target_id: String,
}

impl CatalogChange {
    pub fn caches_repaired() -> Self {
        CatalogChange {
            kind: CatalogChangeKind::CachesRepaired,
            instrument_id: String::new(),
            target_id: String::new(),
        }
    }
}
