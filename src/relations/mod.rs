//! Instrument relations: the relation writer and its cache propagation.

mod command;
mod error;
mod manager;
pub mod sync;

pub use command::{AddAlbumRelation, AddArtistRelation, RelationCommand, RemoveRelation};
pub use error::{OperationOutcome, RelationError};
pub use manager::{
    AlbumRelationDetails, AlbumRelationResult, ArtistRelationDetails, RelationManager,
    ALBUM_NOT_FOUND, ARTIST_NOT_FOUND,
};
