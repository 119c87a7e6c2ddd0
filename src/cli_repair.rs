//! Catalog Repair Tool
//!
//! Rebuilds every instrument reverse cache of a catalog database from its
//! link tables, then exits. Same procedure the server runs on schedule.

use anyhow::{bail, Context, Result};
use clap::Parser;
use instrument_catalog_server::catalog_store::SqliteCatalogStore;
use instrument_catalog_server::repair::run_repair;
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli-repair")]
#[command(about = "Rebuild instrument reverse caches from the link tables")]
struct Args {
    /// Directory holding catalog.db
    #[arg(value_name = "DB_DIR")]
    db_dir: PathBuf,

    /// Exit with an error when any entity failed to update
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    if !args.db_dir.is_dir() {
        bail!("Database directory does not exist: {:?}", args.db_dir);
    }

    let db_path = args.db_dir.join("catalog.db");
    info!("Opening catalog database at {:?}", db_path);
    let store = SqliteCatalogStore::new(&db_path, 1)
        .with_context(|| format!("Failed to open catalog database {:?}", db_path))?;

    let report = run_repair(&store);

    info!("Artists updated: {}", report.artists_updated);
    info!("Albums updated: {}", report.albums_updated);
    info!("Album artist refs updated: {}", report.artist_refs_updated);
    for e in &report.errors {
        error!("  {}", e);
    }

    if !report.success {
        bail!("Repair failed: {}", report.errors.join("; "));
    }
    if args.strict && !report.errors.is_empty() {
        bail!("Repair finished with {} errors", report.errors.len());
    }
    info!("Repair complete");
    Ok(())
}
