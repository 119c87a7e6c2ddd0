//! Reverse-cache repair.
//!
//! Rebuilds every instrument cache from the link tables. This is the only
//! path that restores cache consistency after a partially failed write.

mod rebuild;
mod runner;

pub use rebuild::{rebuild_reverse_caches, ReverseCaches};
pub use runner::{run_repair, RepairReport};
