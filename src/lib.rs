//! Instrument Catalog Server Library
//!
//! Keeps instruments, canonical artists and canonical albums consistent
//! through link records and the reverse caches derived from them. This
//! library exposes the internal modules for testing and reuse by the binaries.

pub mod background_jobs;
pub mod catalog_store;
pub mod config;
pub mod notifications;
pub mod relations;
pub mod repair;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use notifications::{BroadcastChangeNotifier, ChangeNotifier, NoOpChangeNotifier};
pub use relations::{OperationOutcome, RelationCommand, RelationError, RelationManager};
pub use repair::{run_repair, RepairReport};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{Actor, StaticTokenAuthorizer, UserRole};
