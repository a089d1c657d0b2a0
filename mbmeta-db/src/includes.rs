//! Include-token validation
//!
//! Each entity type accepts a fixed set of include tokens naming optional
//! relationship expansions. Validation runs before any database access so
//! an invalid request never touches storage.

use crate::entity::EntityType;
use crate::error::{Error, Result};

/// Allowed include tokens per entity type.
///
/// Entity types without a lookup facade accept no includes.
pub fn allowed_includes(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::Event => &[
            "artist-rels",
            "place-rels",
            "series-rels",
            "url-rels",
            "release-group-rels",
        ],
        EntityType::Place => &["artist-rels", "event-rels", "url-rels"],
        EntityType::Series => &[
            "artist-rels",
            "event-rels",
            "url-rels",
            "release-group-rels",
        ],
        _ => &[],
    }
}

/// Validate requested include tokens for an entity type.
///
/// Fails with [`Error::InvalidInclude`] naming the first unrecognized
/// token. Returns without side effects when all tokens are allowed.
pub fn check_includes(entity_type: EntityType, includes: &[&str]) -> Result<()> {
    let allowed = allowed_includes(entity_type);
    for token in includes {
        if !allowed.contains(token) {
            return Err(Error::InvalidInclude(format!(
                "{} is not a valid include for {}",
                token, entity_type
            )));
        }
    }
    Ok(())
}

/// Map a validated relationship include token to its target entity type
pub fn include_target(token: &str) -> Result<EntityType> {
    match token {
        "artist-rels" => Ok(EntityType::Artist),
        "event-rels" => Ok(EntityType::Event),
        "place-rels" => Ok(EntityType::Place),
        "release-group-rels" => Ok(EntityType::ReleaseGroup),
        "series-rels" => Ok(EntityType::Series),
        "url-rels" => Ok(EntityType::Url),
        other => Err(Error::InvalidInclude(other.to_string())),
    }
}
