//! Typed relation commands.
//!
//! Each variant carries a fixed payload so callers outside HTTP (tooling,
//! jobs) can drive the same writes and get the same outcome shape.

use super::error::{OperationOutcome, RelationError};
use super::manager::{AlbumRelationDetails, ArtistRelationDetails, RelationManager};
use crate::user::Actor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddArtistRelation {
    pub instrument_id: String,
    /// Artist slug
    pub artist_key: String,
    pub details: ArtistRelationDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddAlbumRelation {
    pub instrument_id: String,
    pub album_id: String,
    pub details: AlbumRelationDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRelation {
    pub instrument_id: String,
    pub relation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationCommand {
    AddArtistRelation(AddArtistRelation),
    RemoveArtistRelation(RemoveRelation),
    AddAlbumRelation(AddAlbumRelation),
    RemoveAlbumRelation(RemoveRelation),
}

impl RelationCommand {
    /// Run the command, keeping the typed error.
    pub fn apply(self, manager: &RelationManager, actor: &Actor) -> Result<(), RelationError> {
        match self {
            RelationCommand::AddArtistRelation(cmd) => manager
                .add_artist_relation(actor, &cmd.instrument_id, &cmd.artist_key, cmd.details)
                .map(|_| ()),
            RelationCommand::RemoveArtistRelation(cmd) => manager
                .remove_artist_relation(actor, &cmd.relation_id, &cmd.instrument_id)
                .map(|_| ()),
            RelationCommand::AddAlbumRelation(cmd) => manager
                .add_album_relation(actor, &cmd.instrument_id, &cmd.album_id, cmd.details)
                .map(|_| ()),
            RelationCommand::RemoveAlbumRelation(cmd) => manager
                .remove_album_relation(actor, &cmd.relation_id, &cmd.instrument_id)
                .map(|_| ()),
        }
    }

    pub fn execute(self, manager: &RelationManager, actor: &Actor) -> OperationOutcome {
        self.apply(manager, actor).into()
    }
}
