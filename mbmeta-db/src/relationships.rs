//! Relationship expansion
//!
//! Relationships live in `l_{t0}_{t1}` tables where `t0`/`t1` are the two
//! entity types in lexicographic order, joined to `link` and `link_type`
//! for the relationship metadata. One expander call issues one batched
//! query for all source rows and accumulates the results into a per-call
//! side table ([`IncludesData`]).

use std::collections::{BTreeMap, HashMap};

use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use crate::entity::EntityType;
use crate::error::Result;

/// Direction of a relationship relative to the source entity.
/// Forward means the source sits in the `entity0` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

/// Summary of the entity on the far side of a relationship
#[derive(Debug, Clone)]
pub struct RelatedEntity {
    pub entity_type: EntityType,
    pub mbid: Uuid,
    /// Name of the target row (the URL itself for url targets)
    pub name: String,
    pub comment: Option<String>,
}

/// One relationship row: link metadata plus the target summary
#[derive(Debug, Clone)]
pub struct Relationship {
    pub link_type: String,
    pub direction: Direction,
    pub begin_date: Option<String>,
    pub end_date: Option<String>,
    pub target: RelatedEntity,
}

/// Relationship rows grouped by include category, in query order
pub type RelationshipsByCategory = BTreeMap<&'static str, Vec<Relationship>>;

/// Per-request side table: relationships accumulated per source row id.
///
/// Created empty for each facade call, populated by one expander call per
/// requested include and consumed once by the serializer. Categories are
/// append-only; expanding two target types for the same source id
/// accumulates both, never overwriting.
#[derive(Debug, Default)]
pub struct IncludesData {
    by_source: HashMap<i64, RelationshipsByCategory>,
}

impl IncludesData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one relationship under `category` for `source_id`
    pub fn add(&mut self, source_id: i64, category: &'static str, rel: Relationship) {
        self.by_source
            .entry(source_id)
            .or_default()
            .entry(category)
            .or_default()
            .push(rel);
    }

    /// Relationships accumulated for one source row, if any
    pub fn for_entity(&self, source_id: i64) -> Option<&RelationshipsByCategory> {
        self.by_source.get(&source_id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

/// Relationship table name and column roles for a source/target pair.
/// Returns (table, source column, target column, direction).
fn link_table(
    source: EntityType,
    target: EntityType,
) -> (String, &'static str, &'static str, Direction) {
    if source.table() <= target.table() {
        let table = format!("l_{}_{}", source.table(), target.table());
        (table, "entity0", "entity1", Direction::Forward)
    } else {
        let table = format!("l_{}_{}", target.table(), source.table());
        (table, "entity1", "entity0", Direction::Backward)
    }
}

/// Expand one relationship category for a batch of source rows.
///
/// Issues a single query joining the `l_*` table through `link` and
/// `link_type` to the target entity table, appending every matching row
/// into `includes_data` under the target's category. A no-op for an empty
/// `source_ids` batch; never issues an unbounded query.
pub async fn get_relationship_info(
    conn: &mut SqliteConnection,
    target_type: EntityType,
    source_type: EntityType,
    source_ids: &[i64],
    includes_data: &mut IncludesData,
) -> Result<()> {
    if source_ids.is_empty() {
        return Ok(());
    }

    let (table, source_col, target_col, direction) = link_table(source_type, target_type);
    let comment_expr = if target_type.has_comment() {
        "t.comment"
    } else {
        "''"
    };
    let placeholders = vec!["?"; source_ids.len()].join(", ");

    let sql = format!(
        r#"
        SELECT l.{source_col} AS source_id,
               lt.name AS link_type,
               ln.begin_date AS begin_date,
               ln.end_date AS end_date,
               t.gid AS target_gid,
               t.{name_col} AS target_name,
               {comment_expr} AS target_comment
        FROM {table} l
        JOIN link ln ON ln.id = l.link
        JOIN link_type lt ON lt.id = ln.link_type
        JOIN {target_table} t ON t.id = l.{target_col}
        WHERE l.{source_col} IN ({placeholders})
        ORDER BY l.id
        "#,
        name_col = target_type.name_column(),
        target_table = target_type.table(),
    );

    let mut query = sqlx::query(&sql);
    for id in source_ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(&mut *conn).await?;

    tracing::debug!(
        "Expanded {} {} relationships for {} {} rows",
        rows.len(),
        target_type,
        source_ids.len(),
        source_type
    );

    let category = target_type.rel_category();
    for row in rows {
        let source_id: i64 = row.try_get("source_id")?;
        let gid: String = row.try_get("target_gid")?;
        let comment: String = row.try_get("target_comment")?;

        let rel = Relationship {
            link_type: row.try_get("link_type")?,
            direction,
            begin_date: row.try_get("begin_date")?,
            end_date: row.try_get("end_date")?,
            target: RelatedEntity {
                entity_type: target_type,
                mbid: Uuid::parse_str(&gid)?,
                name: row.try_get("target_name")?,
                comment: (!comment.is_empty()).then_some(comment),
            },
        };
        includes_data.add(source_id, category, rel);
    }

    Ok(())
}
