//! Catalog change notifications.
//!
//! Fire-and-forget hook used to invalidate client-side caches after a
//! successful write. Delivery is best effort and never affects the outcome of
//! the write that triggered it.

mod models;

pub use models::{CatalogChange, CatalogChangeKind};

use tokio::sync::broadcast;
use tracing::debug;

pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, change: CatalogChange);
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpChangeNotifier;

impl ChangeNotifier for NoOpChangeNotifier {
    fn notify(&self, _change: CatalogChange) {}
}

/// Fans notifications out to any number of subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastChangeNotifier {
    tx: broadcast::Sender<CatalogChange>,
}

impl BroadcastChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogChange> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastChangeNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChangeNotifier for BroadcastChangeNotifier {
    fn notify(&self, change: CatalogChange) {
        // Err only means nobody is listening.
        if let Err(e) = self.tx.send(change) {
            debug!("Dropped catalog change notification: {:?}", e.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> CatalogChange {
        CatalogChange {
            kind: CatalogChangeKind::ArtistRelationAdded,
            instrument_id: "i1".to_string(),
            target_id: "a1".to_string(),
        }
    }

    #[test]
    fn notify_without_subscribers_is_silent() {
        BroadcastChangeNotifier::default().notify(change());
    }

    #[tokio::test]
    async fn subscribers_receive_changes() {
        let notifier = BroadcastChangeNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.notify(change());

        assert_eq!(rx.recv().await.unwrap(), change());
    }
}
