//! # mbmeta-web
//!
//! Application wiring for services built on the metadata lookup layer:
//! - TOML configuration loading with a debug override
//! - Pluggable log handlers (rotating file, error-report forwarding)
//! - MBID route validation for axum handlers
//! - Debug-gated diagnostics routes and a standard health endpoint

pub mod app;
pub mod config;
pub mod loggers;
pub mod mbid;

pub use app::{App, AppBuilder};
pub use config::AppConfig;
pub use mbid::Mbid;
