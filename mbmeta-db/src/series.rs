//! Series lookup facade

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::entity::EntityType;
use crate::error::Result;
use crate::fetch::{fetch_multiple, fetch_one, MbEntity};
use crate::relationships::RelationshipsByCategory;
use crate::serialize::add_relationships;

/// Series row (concert tours, festival editions, award runs)
#[derive(Debug, Clone)]
pub struct Series {
    pub id: i64,
    pub gid: Uuid,
    pub name: String,
    pub series_type: Option<String>,
    pub comment: String,
}

impl MbEntity for Series {
    const ENTITY: EntityType = EntityType::Series;
    const COLUMNS: &'static str = "id, gid, name, type, comment";

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let gid: String = row.try_get("gid")?;
        Ok(Series {
            id: row.try_get("id")?,
            gid: Uuid::parse_str(&gid)?,
            name: row.try_get("name")?,
            series_type: row.try_get("type")?,
            comment: row.try_get("comment")?,
        })
    }

    fn row_id(&self) -> i64 {
        self.id
    }

    fn mbid(&self) -> Uuid {
        self.gid
    }

    fn serialize(&self, rels: Option<&RelationshipsByCategory>) -> Value {
        let mut payload = Map::new();
        payload.insert("mbid".to_string(), json!(self.gid.to_string()));
        payload.insert("name".to_string(), json!(self.name));
        if let Some(series_type) = &self.series_type {
            payload.insert("type".to_string(), json!(series_type));
        }
        if !self.comment.is_empty() {
            payload.insert("comment".to_string(), json!(self.comment));
        }
        add_relationships(&mut payload, rels);
        Value::Object(payload)
    }
}

/// Get one series by MBID. `None` when no series (or redirect) matches.
pub async fn get_series_by_mbid(
    pool: &SqlitePool,
    mbid: &str,
    includes: &[&str],
) -> Result<Option<Value>> {
    fetch_one::<Series>(pool, mbid, includes).await
}

/// Get info related to multiple series by MBID, keyed by the requested MBIDs
pub async fn fetch_multiple_series(
    pool: &SqlitePool,
    mbids: &[&str],
    includes: &[&str],
) -> Result<HashMap<String, Value>> {
    fetch_multiple::<Series>(pool, mbids, includes).await
}
