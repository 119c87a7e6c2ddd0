//! Reverse-cache propagation for a single relation change.
//!
//! Add is a set-union append and remove drops the id unconditionally; both are
//! single-document operations, so retrying either is harmless.

use crate::catalog_store::{CatalogStore, ReverseCache};
use anyhow::Result;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Artist,
    Album,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Add,
    Remove,
}

impl SyncKind {
    fn cache(self) -> ReverseCache {
        match self {
            SyncKind::Artist => ReverseCache::ArtistInstruments,
            SyncKind::Album => ReverseCache::AlbumInstruments,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncKind::Artist => "artist",
            SyncKind::Album => "album",
        }
    }
}

impl SyncOp {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncOp::Add => "add",
            SyncOp::Remove => "remove",
        }
    }
}

/// Apply one relation change to the `instruments` cache of `target_id`.
/// Returns whether the cache changed.
pub fn propagate(
    store: &dyn CatalogStore,
    kind: SyncKind,
    op: SyncOp,
    instrument_id: &str,
    target_id: &str,
) -> Result<bool> {
    let cache = kind.cache();
    let changed = match op {
        SyncOp::Add => store.add_to_reverse_cache(cache, target_id, instrument_id)?,
        SyncOp::Remove => store.remove_from_reverse_cache(cache, target_id, instrument_id)?,
    };
    debug!(
        "Propagated {} {} of instrument {} to {} (changed={})",
        kind.as_str(),
        op.as_str(),
        instrument_id,
        target_id,
        changed
    );
    Ok(changed)
}
