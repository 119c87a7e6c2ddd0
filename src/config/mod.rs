mod file_config;

pub use file_config::{AuthConfig, BackgroundJobsConfig, FileConfig};

use crate::server::RequestsLoggingLevel;
use crate::user::TokenGrant;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub repair_interval_hours: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,

    pub auth: AuthSettings,
    pub background_jobs: BackgroundJobsSettings,
}

#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    pub tokens: Vec<TokenGrant>,
}

#[derive(Debug, Clone, Default)]
pub struct BackgroundJobsSettings {
    /// `None` when periodic repair is disabled.
    pub repair_interval_hours: Option<u64>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port != 0 && port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let auth = AuthSettings {
            tokens: file.auth.map(|a| a.tokens).unwrap_or_default(),
        };

        let repair_interval_hours = file
            .background_jobs
            .and_then(|b| b.repair_interval_hours)
            .or(cli.repair_interval_hours)
            .filter(|hours| *hours > 0);

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            auth,
            background_jobs: BackgroundJobsSettings {
                repair_interval_hours,
            },
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join("catalog.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
