use crate::catalog_store::CatalogStore;
use crate::notifications::ChangeNotifier;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    pub catalog_store: Arc<dyn CatalogStore>,

    /// Told about catalog changes made by jobs.
    pub notifier: Arc<dyn ChangeNotifier>,
}

impl JobContext {
    pub fn new(
        cancellation_token: CancellationToken,
        catalog_store: Arc<dyn CatalogStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            cancellation_token,
            catalog_store,
            notifier,
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
