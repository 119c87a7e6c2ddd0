mod models;
mod schema;
mod store;
mod trait_def;

pub use models::*;
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::{SqliteCatalogStore, DEFAULT_READ_POOL_SIZE};
pub use trait_def::CatalogStore;

#[cfg(any(test, feature = "mock"))]
pub use trait_def::MockCatalogStore;
