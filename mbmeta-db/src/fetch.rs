//! Generic lookup orchestration
//!
//! One implementation of the validate → resolve → expand → serialize
//! sequence, shared by every entity facade. Per-type behavior (columns,
//! row decoding, intrinsic serialization, allowed includes) comes from the
//! [`MbEntity`] descriptor trait, so facades stay thin wrappers.

use std::collections::HashMap;

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::entity::EntityType;
use crate::error::Result;
use crate::includes::{check_includes, include_target};
use crate::lookup::get_entities_by_gids;
use crate::relationships::{get_relationship_info, IncludesData, RelationshipsByCategory};

/// Descriptor for a row type the generic lookup can resolve and serialize
pub trait MbEntity: Sized + Clone + Send {
    /// Entity type of the backing table
    const ENTITY: EntityType;

    /// Column list for SELECTs against the entity table
    const COLUMNS: &'static str;

    /// Decode one row fetched with [`MbEntity::COLUMNS`]
    fn from_row(row: &SqliteRow) -> Result<Self>;

    /// Internal row id (stable identity)
    fn row_id(&self) -> i64;

    /// Canonical MBID of the row
    fn mbid(&self) -> Uuid;

    /// Serialize intrinsic attributes plus any expanded relationships.
    /// Pure; categories absent from `rels` must be absent from the output.
    fn serialize(&self, rels: Option<&RelationshipsByCategory>) -> Value;
}

/// Look up multiple entities by MBID.
///
/// Returns a map keyed by the *requested* MBIDs. MBIDs with no matching
/// row and no redirect are absent from the map, not errors. When a
/// requested MBID reaches a row through a redirect, the key stays the
/// caller's MBID while the payload carries the canonical one.
///
/// Holds one pooled connection for the whole call; it is returned to the
/// pool on every exit path when the guard drops.
pub async fn fetch_multiple<E: MbEntity>(
    pool: &SqlitePool,
    mbids: &[&str],
    includes: &[&str],
) -> Result<HashMap<String, Value>> {
    check_includes(E::ENTITY, includes)?;

    if mbids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut conn = pool.acquire().await?;

    let entities = get_entities_by_gids::<E>(&mut conn, mbids).await?;

    // Distinct row ids: two requested MBIDs may redirect to the same row
    let mut entity_ids: Vec<i64> = entities.values().map(E::row_id).collect();
    entity_ids.sort_unstable();
    entity_ids.dedup();

    let mut includes_data = IncludesData::new();
    for token in includes {
        let target = include_target(token)?;
        get_relationship_info(&mut conn, target, E::ENTITY, &entity_ids, &mut includes_data)
            .await?;
    }

    Ok(entities
        .into_iter()
        .map(|(requested_mbid, entity)| {
            let payload = entity.serialize(includes_data.for_entity(entity.row_id()));
            (requested_mbid, payload)
        })
        .collect())
}

/// Look up a single entity by MBID.
///
/// Equivalent to `fetch_multiple([mbid]).remove(mbid)`; `None` when the
/// MBID does not resolve.
pub async fn fetch_one<E: MbEntity>(
    pool: &SqlitePool,
    mbid: &str,
    includes: &[&str],
) -> Result<Option<Value>> {
    Ok(fetch_multiple::<E>(pool, &[mbid], includes)
        .await?
        .remove(mbid))
}
