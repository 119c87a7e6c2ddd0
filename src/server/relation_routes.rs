use super::session::Session;
use super::state::ServerState;
use crate::relations::{
    AddAlbumRelation, AddArtistRelation, AlbumRelationDetails, ArtistRelationDetails,
    OperationOutcome, RelationCommand, RelationError, RemoveRelation,
};
use crate::user::Permission;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize, Debug)]
struct AddArtistRelationBody {
    pub artist_key: String,
    #[serde(default)]
    pub years_used: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AddAlbumRelationBody {
    pub album_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

fn status_for(error: &RelationError) -> StatusCode {
    match error {
        RelationError::NotFound(_) => StatusCode::NOT_FOUND,
        RelationError::Unauthorized => StatusCode::FORBIDDEN,
        RelationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        RelationError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Runs the blocking relation write off the async runtime and renders the outcome.
async fn run_command(state: ServerState, session: Session, command: RelationCommand) -> Response {
    debug!("User {} runs {:?}", session.actor.user, command);
    let manager = state.relation_manager.clone();
    let result =
        tokio::task::spawn_blocking(move || command.apply(&manager, &session.actor)).await;

    match result {
        Ok(Ok(())) => Json(OperationOutcome::ok()).into_response(),
        Ok(Err(err)) => {
            let status = status_for(&err);
            (status, Json(OperationOutcome::failed(err.to_string()))).into_response()
        }
        Err(join_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(OperationOutcome::failed(format!("{}", join_err))),
        )
            .into_response(),
    }
}

async fn add_artist_relation(
    session: Session,
    State(state): State<ServerState>,
    Path(instrument_id): Path<String>,
    Json(body): Json<AddArtistRelationBody>,
) -> Response {
    let command = RelationCommand::AddArtistRelation(AddArtistRelation {
        instrument_id,
        artist_key: body.artist_key,
        details: ArtistRelationDetails {
            years_used: body.years_used,
            notes: body.notes,
        },
    });
    run_command(state, session, command).await
}

async fn remove_artist_relation(
    session: Session,
    State(state): State<ServerState>,
    Path((instrument_id, relation_id)): Path<(String, String)>,
) -> Response {
    let command = RelationCommand::RemoveArtistRelation(RemoveRelation {
        instrument_id,
        relation_id,
    });
    run_command(state, session, command).await
}

async fn add_album_relation(
    session: Session,
    State(state): State<ServerState>,
    Path(instrument_id): Path<String>,
    Json(body): Json<AddAlbumRelationBody>,
) -> Response {
    let command = RelationCommand::AddAlbumRelation(AddAlbumRelation {
        instrument_id,
        album_id: body.album_id,
        details: AlbumRelationDetails { notes: body.notes },
    });
    run_command(state, session, command).await
}

async fn remove_album_relation(
    session: Session,
    State(state): State<ServerState>,
    Path((instrument_id, relation_id)): Path<(String, String)>,
) -> Response {
    let command = RelationCommand::RemoveAlbumRelation(RemoveRelation {
        instrument_id,
        relation_id,
    });
    run_command(state, session, command).await
}

async fn get_relations(
    session: Session,
    State(state): State<ServerState>,
    Path(instrument_id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::AccessCatalog) {
        return super::session::access_denied();
    }
    let manager = state.relation_manager.clone();
    let result =
        tokio::task::spawn_blocking(move || manager.relations_for_instrument(&instrument_id))
            .await;
    match result {
        Ok(Ok(relations)) => Json(relations).into_response(),
        Ok(Err(err)) => (
            status_for(&err),
            Json(OperationOutcome::failed(err.to_string())),
        )
            .into_response(),
        Err(join_err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", join_err)).into_response(),
    }
}

/// Routes mounted under `/v1/instrument`.
pub fn make_relation_routes(state: ServerState) -> Router {
    Router::new()
        .route("/{instrument_id}/artists", post(add_artist_relation))
        .route(
            "/{instrument_id}/artists/{relation_id}",
            delete(remove_artist_relation),
        )
        .route("/{instrument_id}/albums", post(add_album_relation))
        .route(
            "/{instrument_id}/albums/{relation_id}",
            delete(remove_album_relation),
        )
        .route("/{instrument_id}/relations", get(get_relations))
        .with_state(state)
}
