//! Event lookup facade
//!
//! Events are the reference entity type: concerts, festivals and other
//! dated happenings, related to the artists performing, the places they
//! were held at and the series they belong to.

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

/// Event row
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub gid: Uuid,
    pub name: String,
    pub event_type: Option<String>,
    pub time: Option<String>,
    pub cancelled: bool,
    pub comment: String,
    pub begin_date: Option<String>,
    pub end_date: Option<String>,
}

impl MbEntity for Event {
    const ENTITY: EntityType = EntityType::Event;
    const COLUMNS: &'static str = "id, gid, name, type, time, cancelled, comment, begin_date, end_date";

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let gid: String = row.try_get("gid")?;
        let cancelled: i64 = row.try_get("cancelled")?;
        Ok(Event {
            id: row.try_get("id")?,
            gid: Uuid::parse_str(&gid)?,
            name: row.try_get("name")?,
            event_type: row.try_get("type")?,
            time: row.try_get("time")?,
            cancelled: cancelled != 0,
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
        if let Some(event_type) = &self.event_type {
            payload.insert("type".to_string(), json!(event_type));
        }
        if let Some(span) = life_span(self.begin_date.as_deref(), self.end_date.as_deref()) {
            payload.insert("life-span".to_string(), span);
        }
        if let Some(time) = &self.time {
            payload.insert("time".to_string(), json!(time));
        }
        payload.insert("cancelled".to_string(), json!(self.cancelled));
        if !self.comment.is_empty() {
            payload.insert("comment".to_string(), json!(self.comment));
        }
        add_relationships(&mut payload, rels);
        Value::Object(payload)
    }
}

/// Get one event by MBID.
///
/// Returns `None` when no event (or redirect) matches. The payload's
/// `mbid` is the canonical MBID, which differs from the argument when the
/// lookup followed a redirect.
pub async fn get_event_by_mbid(
    pool: &SqlitePool,
    mbid: &str,
    includes: &[&str],
) -> Result<Option<Value>> {
    fetch_one::<Event>(pool, mbid, includes).await
}

/// Get info related to multiple events by MBID.
///
/// The returned map is keyed by the MBIDs given as arguments; MBIDs that
/// don't resolve are absent. Requested includes are expanded with one
/// batched query each across all resolved events.
pub async fn fetch_multiple_events(
    pool: &SqlitePool,
    mbids: &[&str],
    includes: &[&str],
) -> Result<HashMap<String, Value>> {
    fetch_multiple::<Event>(pool, mbids, includes).await
}
