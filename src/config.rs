// ⚙️ Configuration - optional TOML file, overridden by OPS_SETTINGS__* environment variables
//
//   bind_addr      = "0.0.0.0:3000"
//   log_level      = "info"
//   seed_defaults  = true
//   [database]
//   path = "ops-settings.db"      # omit for an in-memory store
//   [[tokens]]
//   token = "..."
//   caller_id = "..."
//   name = "..."
//   role = "admin"                # or "staff"

use crate::auth::TokenGrant;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_CONFIG_FILE: &str = "config/ops-settings.toml";
pub const ENV_PREFIX: &str = "OPS_SETTINGS";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Insert the default categories/branches at startup
    #[serde(default = "default_seed")]
    pub seed_defaults: bool,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub tokens: Vec<TokenGrant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file; `None` keeps everything in memory
    pub path: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_seed() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: default_bind_addr(),
            log_level: default_log_level(),
            seed_defaults: default_seed(),
            database: DatabaseConfig::default(),
            tokens: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from `config/ops-settings.toml` (if present) plus environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load from a specific file (optional) plus environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Configuration has invalid or missing values")
    }
}

/// Install the global tracing subscriber. RUST_LOG wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding); keep it
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .try_init();
}
