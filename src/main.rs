use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use instrument_catalog_server::background_jobs::jobs::CatalogRepairJob;
use instrument_catalog_server::background_jobs::{JobContext, JobScheduler};
use instrument_catalog_server::catalog_store::{
    CatalogStore, SqliteCatalogStore, DEFAULT_READ_POOL_SIZE,
};
use instrument_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use instrument_catalog_server::notifications::{BroadcastChangeNotifier, ChangeNotifier};
use instrument_catalog_server::server::{self, run_server, RequestsLoggingLevel, ServerConfig};
use instrument_catalog_server::user::{Authorizer, StaticTokenAuthorizer};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding catalog.db. Can also be set in the config file.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the CLI ones.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Interval in hours between catalog cache repairs. 0 disables the job.
    #[clap(long)]
    pub repair_interval_hours: Option<u64>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            repair_interval_hours: self.repair_interval_hours,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!(
        "Opening SQLite catalog database at {:?}...",
        app_config.catalog_db_path()
    );
    let catalog_store = Arc::new(SqliteCatalogStore::new(
        app_config.catalog_db_path(),
        DEFAULT_READ_POOL_SIZE,
    )?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();
    server::metrics::init_catalog_metrics(
        catalog_store.get_artists_count(),
        catalog_store.get_albums_count(),
        catalog_store.get_artist_links_count(),
        catalog_store.get_album_links_count(),
    );

    let authorizer = StaticTokenAuthorizer::from_grants(&app_config.auth.tokens);
    if authorizer.is_empty() {
        info!("No API tokens configured, every protected route will answer 403");
    } else {
        info!("Loaded {} API tokens", authorizer.len());
    }
    let authorizer: Arc<dyn Authorizer> = Arc::new(authorizer);
    let notifier: Arc<dyn ChangeNotifier> = Arc::new(BroadcastChangeNotifier::default());
    let catalog_store: Arc<dyn CatalogStore> = catalog_store;

    let shutdown_token = CancellationToken::new();

    let scheduler_handle = match app_config.background_jobs.repair_interval_hours {
        Some(hours) => {
            info!("Catalog repair job enabled, running every {} hours", hours);
            let job_context = JobContext::new(
                shutdown_token.child_token(),
                catalog_store.clone(),
                notifier.clone(),
            );
            let mut scheduler = JobScheduler::new(shutdown_token.clone(), job_context);
            scheduler.register_job(Arc::new(CatalogRepairJob::every_hours(hours)));
            Some(tokio::spawn(async move { scheduler.run().await }))
        }
        None => None,
    };

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
    };
    let result = run_server(
        server_config,
        catalog_store,
        authorizer,
        notifier,
        shutdown_token.clone(),
    )
    .await;

    shutdown_token.cancel();
    if let Some(handle) = scheduler_handle {
        let _ = handle.await;
    }
    result
}
