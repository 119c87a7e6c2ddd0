use axum::extract::FromRef;

use crate::catalog_store::CatalogStore;
use crate::notifications::ChangeNotifier;
use crate::relations::RelationManager;
use crate::user::Authorizer;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalogStore = Arc<dyn CatalogStore>;
pub type GuardedRelationManager = Arc<RelationManager>;
pub type GuardedAuthorizer = Arc<dyn Authorizer>;
pub type GuardedChangeNotifier = Arc<dyn ChangeNotifier>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog_store: GuardedCatalogStore,
    pub relation_manager: GuardedRelationManager,
    pub authorizer: GuardedAuthorizer,
    pub notifier: GuardedChangeNotifier,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog_store: GuardedCatalogStore,
        authorizer: GuardedAuthorizer,
        notifier: GuardedChangeNotifier,
    ) -> Self {
        let relation_manager = Arc::new(RelationManager::new(
            catalog_store.clone(),
            notifier.clone(),
        ));
        ServerState {
            config,
            start_time: Instant::now(),
            catalog_store,
            relation_manager,
            authorizer,
            notifier,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogStore {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_store.clone()
    }
}

impl FromRef<ServerState> for GuardedRelationManager {
    fn from_ref(input: &ServerState) -> Self {
        input.relation_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedChangeNotifier {
    fn from_ref(input: &ServerState) -> Self {
        input.notifier.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
