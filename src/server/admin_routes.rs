use super::session::{access_denied, Session};
use super::state::ServerState;
use crate::notifications::CatalogChange;
use crate::repair::run_repair;
use crate::user::Permission;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{error, info};

/// Rebuilds every reverse cache from the link tables and returns the report.
async fn repair_catalog(session: Session, State(state): State<ServerState>) -> Response {
    if !session.has_permission(Permission::ServerAdmin) {
        return access_denied();
    }
    info!("Catalog repair requested by {}", session.actor.user);

    let store = state.catalog_store.clone();
    let report = match tokio::task::spawn_blocking(move || run_repair(store.as_ref())).await {
        Ok(report) => report,
        Err(e) => {
            error!("Catalog repair task failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if report.success {
        state.notifier.notify(CatalogChange::caches_repaired());
    }
    Json(report).into_response()
}

/// Routes mounted under `/v1/admin`.
pub fn make_admin_routes(state: ServerState) -> Router {
    Router::new()
        .route("/catalog/repair", post(repair_catalog))
        .with_state(state)
}
