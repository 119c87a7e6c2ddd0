//! Concrete background job implementations.

mod catalog_repair;

pub use catalog_repair::CatalogRepairJob;
