//! Place lookup facade

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::entity::EntityType;
use crate::error::Result;
use crate::fetch::{fetch_multiple, fetch_one, MbEntity};
use crate::relationships::RelationshipsByCategory;
use crate::serialize::{add_relationships, life_span};

/// Place row (venues, studios, stadiums)
#[derive(Debug, Clone)]
pub struct Place {
    pub id: i64,
    pub gid: Uuid,
    pub name: String,
    pub place_type: Option<String>,
    pub address: Option<String>,
    pub comment: String,
    pub begin_date: Option<String>,
    pub end_date: Option<String>,
}

impl MbEntity for Place {
    const ENTITY: EntityType = EntityType::Place;
    const COLUMNS: &'static str = "id, gid, name, type, address, comment, begin_date, end_date";

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let gid: String = row.try_get("gid")?;
        Ok(Place {
            id: row.try_get("id")?,
            gid: Uuid::parse_str(&gid)?,
            name: row.try_get("name")?,
            place_type: row.try_get("type")?,
            address: row.try_get("address")?,
            comment: row.try_get("comment")?,
            begin_date: row.try_get("begin_date")?,
            end_date: row.try_get("end_date")?,
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
        if let Some(place_type) = &self.place_type {
            payload.insert("type".to_string(), json!(place_type));
        }
        if let Some(address) = &self.address {
            payload.insert("address".to_string(), json!(address));
        }
        if let Some(span) = life_span(self.begin_date.as_deref(), self.end_date.as_deref()) {
            payload.insert("life-span".to_string(), span);
        }
        if !self.comment.is_empty() {
            payload.insert("comment".to_string(), json!(self.comment));
        }
        add_relationships(&mut payload, rels);
        Value::Object(payload)
    }
}

/// Get one place by MBID. `None` when no place (or redirect) matches.
pub async fn get_place_by_mbid(
    pool: &SqlitePool,
    mbid: &str,
    includes: &[&str],
) -> Result<Option<Value>> {
    fetch_one::<Place>(pool, mbid, includes).await
}

/// Get info related to multiple places by MBID, keyed by the requested MBIDs
pub async fn fetch_multiple_places(
    pool: &SqlitePool,
    mbids: &[&str],
    includes: &[&str],
) -> Result<HashMap<String, Value>> {
    fetch_multiple::<Place>(pool, mbids, includes).await
}
