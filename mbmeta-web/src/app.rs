//! Application builder
//!
//! Thin wiring over axum: config-file loading with a debug override,
//! logger attachment, a standard health endpoint and debug-gated
//! diagnostics routes. Route handlers and the metadata facades stay the
//! caller's business.

use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::config::{resolve_config_path, AppConfig};
use crate::loggers;

/// Builder for [`App`]
pub struct AppBuilder {
    name: String,
    config_file: Option<PathBuf>,
    debug_override: Option<bool>,
}

impl AppBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config_file: None,
            debug_override: None,
        }
    }

    /// Load configuration from a TOML file at build time
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the config file's debug flag
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug_override = Some(debug);
        self
    }

    pub fn build(self) -> Result<App> {
        // explicit file beats the env var; neither set means defaults
        let config_path = match self.config_file.clone() {
            Some(path) => Some(path),
            None => resolve_config_path(None, &config_env_var(&self.name)),
        };
        let mut config = match &config_path {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(debug) = self.debug_override {
            config.debug = debug;
        }

        let name = self.name.clone();
        let router = Router::new().route(
            "/health",
            get(move || {
                let name = name.clone();
                async move {
                    Json(json!({
                        "status": "ok",
                        "module": name,
                        "version": env!("CARGO_PKG_VERSION"),
                    }))
                }
            }),
        );

        Ok(App {
            name: self.name,
            config,
            router,
        })
    }
}

/// A configured application: settings plus the base router
pub struct App {
    pub name: String,
    pub config: AppConfig,
    router: Router,
}

impl App {
    /// Attach the log handlers named in the config.
    /// Sections left out attach nothing beyond the stdout logger.
    pub fn init_loggers(&self) -> Result<()> {
        loggers::init_loggers(
            self.config.log.file.as_ref(),
            self.config.log.error_report.as_ref(),
        )
    }

    /// Mount the diagnostics routes, gated on debug mode.
    ///
    /// Requires both `debug = true` and a configured `secret_key`;
    /// otherwise this is a no-op and the routes 404.
    pub fn init_debug_routes(&mut self) {
        if !self.config.debug || self.config.secret_key.is_none() {
            tracing::debug!("Diagnostics routes disabled");
            return;
        }

        let config = self.config.clone();
        let debug_router = Router::new().route(
            "/debug/config",
            get(move || {
                let config = config.clone();
                async move { Json(sanitized_config(&config)) }
            }),
        );
        self.router = self.router.clone().merge(debug_router);
        tracing::info!("Diagnostics routes enabled at /debug");
    }

    /// Open the metadata database pool named in the config, if any
    pub async fn connect_db(&self) -> Result<Option<SqlitePool>> {
        match &self.config.database {
            Some(db) => Ok(Some(mbmeta_db::connect(&db.url).await?)),
            None => Ok(None),
        }
    }

    /// Merge application-specific routes into the app router
    pub fn merge(mut self, routes: Router) -> Self {
        self.router = self.router.merge(routes);
        self
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind and serve until the process exits
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("{} listening on http://{}", self.name, addr);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

/// Environment variable consulted when no config file is set explicitly,
/// e.g. `MBMETA_UI_CONFIG` for an app named "mbmeta-ui"
fn config_env_var(name: &str) -> String {
    format!("{}_CONFIG", name.to_uppercase().replace('-', "_"))
}

/// Config view safe to expose on the diagnostics route
fn sanitized_config(config: &AppConfig) -> Value {
    json!({
        "debug": config.debug,
        "secret_key_set": config.secret_key.is_some(),
        "database_configured": config.database.is_some(),
        "log": {
            "file": config.log.file.as_ref().map(|f| json!({
                "filename": f.filename.display().to_string(),
                "max_bytes": f.max_bytes,
                "backup_count": f.backup_count,
            })),
            "error_report_level": config.log.error_report.as_ref().map(|r| r.level.clone()),
        },
    })
}
