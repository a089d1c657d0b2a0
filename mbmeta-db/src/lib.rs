//! # mbmeta-db
//!
//! Read-only lookup layer over a MusicBrainz-style metadata schema:
//! - MBID resolution with transparent redirect following
//! - Include-token validation and batched relationship expansion
//! - Serialization of rows into plain JSON dictionaries
//! - One lookup facade pair per entity type (event, place, series)

pub mod entity;
pub mod error;
pub mod event;
pub mod fetch;
pub mod includes;
pub mod lookup;
pub mod place;
pub mod relationships;
pub mod schema;
pub mod serialize;
pub mod series;

pub use entity::EntityType;
pub use error::{Error, Result};

use sqlx::SqlitePool;

/// Open a connection pool against a metadata database.
///
/// The URL is passed to sqlx unchanged, e.g. `sqlite://meta.db?mode=ro`
/// for an existing read-only database or `sqlite::memory:` for tests.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    tracing::debug!("Connecting to metadata database: {}", database_url);
    let pool = SqlitePool::connect(database_url).await?;
    Ok(pool)
}
