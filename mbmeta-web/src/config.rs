//! Application configuration loading
//!
//! TOML config with optional sections; an absent section leaves the
//! matching feature (log handler, database, debug routes) disabled.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Debug mode; gates the diagnostics routes
    #[serde(default)]
    pub debug: bool,

    /// Secret key; diagnostics routes stay off without one
    pub secret_key: Option<String>,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx database URL, e.g. `sqlite://meta.db?mode=ro`
    pub url: String,
}

/// Log handler configuration; `None` sections attach no handler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    pub file: Option<FileLogConfig>,
    pub error_report: Option<ErrorReportConfig>,
}

/// Size-rotated log file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLogConfig {
    pub filename: PathBuf,

    /// Rotate once the current file would exceed this size
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Rotated files to keep (`filename.1` .. `filename.N`)
    #[serde(default = "default_backup_count")]
    pub backup_count: u32,
}

fn default_max_bytes() -> u64 {
    512 * 1024
}

fn default_backup_count() -> u32 {
    100
}

/// Error forwarding to an external collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReportConfig {
    /// Collector endpoint receiving JSON reports
    pub dsn: String,

    /// Minimum severity to forward ("error", "warn", ...)
    #[serde(default = "default_report_level")]
    pub level: String,
}

fn default_report_level() -> String {
    "warn".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

/// Config file resolution priority order:
/// 1. Explicit argument (highest priority)
/// 2. Environment variable
/// 3. None (defaults apply)
pub fn resolve_config_path(explicit: Option<&str>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var(env_var_name) {
        return Some(PathBuf::from(path));
    }
    None
}
