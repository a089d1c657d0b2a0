//! Entity types of the MusicBrainz-style schema
//!
//! Every entity table shares the same identity layout: `id` (internal,
//! stable) and `gid` (external MBID, may be redirected after a merge).
//! The rest of the schema is derived from the entity type: redirect table
//! names, relationship (`l_*`) table names and include-token categories.

use std::fmt;

/// Entity types supported by the lookup layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Artist,
    Event,
    Place,
    ReleaseGroup,
    Series,
    Url,
}

impl EntityType {
    /// Table name in the schema (also the canonical type string)
    pub fn table(self) -> &'static str {
        match self {
            EntityType::Artist => "artist",
            EntityType::Event => "event",
            EntityType::Place => "place",
            EntityType::ReleaseGroup => "release_group",
            EntityType::Series => "series",
            EntityType::Url => "url",
        }
    }

    /// Redirect table mapping merged-away MBIDs to the canonical row id
    pub fn redirect_table(self) -> String {
        format!("{}_gid_redirect", self.table())
    }

    /// Include token / side-table category for relationships targeting
    /// this entity type ("artist-rels", "url-rels", ...)
    pub fn rel_category(self) -> &'static str {
        match self {
            EntityType::Artist => "artist-rels",
            EntityType::Event => "event-rels",
            EntityType::Place => "place-rels",
            EntityType::ReleaseGroup => "release-group-rels",
            EntityType::Series => "series-rels",
            EntityType::Url => "url-rels",
        }
    }

    /// Key used when nesting this entity inside a serialized relationship
    pub fn json_key(self) -> &'static str {
        match self {
            EntityType::ReleaseGroup => "release-group",
            other => other.table(),
        }
    }

    /// Column holding the human-readable value of a row.
    /// URL rows store the URL itself instead of a name.
    pub fn name_column(self) -> &'static str {
        match self {
            EntityType::Url => "url",
            _ => "name",
        }
    }

    /// Whether the entity table carries a disambiguation comment
    pub fn has_comment(self) -> bool {
        !matches!(self, EntityType::Url)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
