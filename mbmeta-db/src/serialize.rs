//! Serialization helpers shared by the entity facades
//!
//! Pure dictionary shaping, no I/O. Consumers branch on key presence, so
//! optional values are omitted keys rather than nulls or empty lists.

use serde_json::{json, Map, Value};

use crate::relationships::{Relationship, RelationshipsByCategory};

/// Life-span object from partial begin/end dates.
/// `None` when neither date is set, so the key can be omitted.
pub fn life_span(begin_date: Option<&str>, end_date: Option<&str>) -> Option<Value> {
    if begin_date.is_none() && end_date.is_none() {
        return None;
    }
    let mut span = Map::new();
    if let Some(begin) = begin_date {
        span.insert("begin".to_string(), json!(begin));
    }
    if let Some(end) = end_date {
        span.insert("end".to_string(), json!(end));
    }
    Some(Value::Object(span))
}

/// Append every expanded relationship category to a serialized entity.
/// Categories that were never expanded stay absent.
pub fn add_relationships(payload: &mut Map<String, Value>, rels: Option<&RelationshipsByCategory>) {
    if let Some(rels) = rels {
        for (category, relationships) in rels {
            payload.insert(
                category.to_string(),
                serialize_relationships(relationships),
            );
        }
    }
}

/// Serialize one relationship category as a list
pub fn serialize_relationships(rels: &[Relationship]) -> Value {
    Value::Array(rels.iter().map(serialize_relationship).collect())
}

fn serialize_relationship(rel: &Relationship) -> Value {
    let mut out = Map::new();
    out.insert("type".to_string(), json!(rel.link_type));
    out.insert("direction".to_string(), json!(rel.direction.as_str()));
    if let Some(begin) = &rel.begin_date {
        out.insert("begin".to_string(), json!(begin));
    }
    if let Some(end) = &rel.end_date {
        out.insert("end".to_string(), json!(end));
    }

    let mut target = Map::new();
    target.insert("mbid".to_string(), json!(rel.target.mbid.to_string()));
    target.insert(
        rel.target.entity_type.name_column().to_string(),
        json!(rel.target.name),
    );
    if let Some(comment) = &rel.target.comment {
        target.insert("comment".to_string(), json!(comment));
    }
    out.insert(
        rel.target.entity_type.json_key().to_string(),
        Value::Object(target),
    );

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use crate::relationships::{Direction, RelatedEntity};
    use uuid::Uuid;

    fn sample_rel(entity_type: EntityType, name: &str, comment: Option<&str>) -> Relationship {
        Relationship {
            link_type: "main performer".to_string(),
            direction: Direction::Backward,
            begin_date: Some("2006-06-09".to_string()),
            end_date: None,
            target: RelatedEntity {
                entity_type,
                mbid: Uuid::nil(),
                name: name.to_string(),
                comment: comment.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_life_span_omitted_when_empty() {
        assert!(life_span(None, None).is_none());
        let span = life_span(Some("1969"), None).unwrap();
        assert_eq!(span["begin"], "1969");
        assert!(span.get("end").is_none());
    }

    #[test]
    fn test_relationship_shape() {
        let value = serialize_relationships(&[sample_rel(
            EntityType::Artist,
            "Massive Attack",
            Some("trip hop group"),
        )]);
        let rel = &value[0];
        assert_eq!(rel["type"], "main performer");
        assert_eq!(rel["direction"], "backward");
        assert_eq!(rel["begin"], "2006-06-09");
        assert!(rel.get("end").is_none());
        assert_eq!(rel["artist"]["name"], "Massive Attack");
        assert_eq!(rel["artist"]["comment"], "trip hop group");
    }

    #[test]
    fn test_url_target_uses_url_field() {
        let value = serialize_relationships(&[sample_rel(
            EntityType::Url,
            "https://example.com/",
            None,
        )]);
        let rel = &value[0];
        assert_eq!(rel["url"]["url"], "https://example.com/");
        assert!(rel["url"].get("comment").is_none());
    }

    #[test]
    fn test_absent_categories_stay_absent() {
        let mut payload = Map::new();
        add_relationships(&mut payload, None);
        assert!(payload.is_empty());
    }
}
