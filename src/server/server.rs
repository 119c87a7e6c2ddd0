use anyhow::{Context, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::admin_routes::make_admin_routes;
use super::metrics::metrics_handler;
use super::relation_routes::make_relation_routes;
use super::session::{access_denied, Session};
use super::state::{GuardedAuthorizer, GuardedCatalogStore, GuardedChangeNotifier, ServerState};
use super::{log_requests, ServerConfig};
use crate::user::Permission;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub user: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        user: session.map(|s| s.actor.user),
    };
    Json(stats)
}

async fn get_artist(
    session: Session,
    State(catalog_store): State<GuardedCatalogStore>,
    Path(slug): Path<String>,
) -> Response {
    if !session.has_permission(Permission::AccessCatalog) {
        return access_denied();
    }
    match catalog_store.get_artist_by_slug(&slug) {
        Ok(Some(artist)) => Json(artist).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err)).into_response(),
    }
}

async fn get_album(
    session: Session,
    State(catalog_store): State<GuardedCatalogStore>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::AccessCatalog) {
        return access_denied();
    }
    match catalog_store.get_album(&id) {
        Ok(Some(album)) => Json(album).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err)).into_response(),
    }
}

pub fn make_app(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    authorizer: GuardedAuthorizer,
    notifier: GuardedChangeNotifier,
) -> Result<Router> {
    let state = ServerState::new(config, catalog_store, authorizer, notifier);

    let content_routes: Router = Router::new()
        .route("/artist/{slug}", get(get_artist))
        .route("/album/{id}", get(get_album))
        .with_state(state.clone());

    let v1_routes: Router = content_routes
        .nest("/instrument", make_relation_routes(state.clone()))
        .nest("/admin", make_admin_routes(state.clone()));

    let app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/v1", v1_routes)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API and the metrics endpoint until `shutdown` is cancelled.
pub async fn run_server(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    authorizer: GuardedAuthorizer,
    notifier: GuardedChangeNotifier,
    shutdown: CancellationToken,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, catalog_store, authorizer, notifier)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    let metrics_shutdown = shutdown.clone();
    let metrics_server = tokio::spawn(async move {
        let result = axum::serve(metrics_listener, make_metrics_app())
            .with_graceful_shutdown(async move { metrics_shutdown.cancelled().await })
            .await;
        if let Err(e) = result {
            error!("Metrics server error: {}", e);
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    let _ = metrics_server.await;
    info!("Server stopped");
    Ok(())
}
