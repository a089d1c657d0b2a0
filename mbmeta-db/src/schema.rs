//! Schema initialization
//!
//! Compact mirror of the MusicBrainz tables the lookup layer queries.
//! Production deployments point at an existing database; this DDL exists
//! for embedded databases and the `sqlite::memory:` test fixtures.

use sqlx::SqlitePool;

use crate::error::Result;

const ENTITY_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS artist (
        id INTEGER PRIMARY KEY,
        gid TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        sort_name TEXT,
        type TEXT,
        comment TEXT NOT NULL DEFAULT '',
        begin_date TEXT,
        end_date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event (
        id INTEGER PRIMARY KEY,
        gid TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        type TEXT,
        time TEXT,
        cancelled INTEGER NOT NULL DEFAULT 0,
        comment TEXT NOT NULL DEFAULT '',
        begin_date TEXT,
        end_date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS place (
        id INTEGER PRIMARY KEY,
        gid TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        type TEXT,
        address TEXT,
        comment TEXT NOT NULL DEFAULT '',
        begin_date TEXT,
        end_date TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS series (
        id INTEGER PRIMARY KEY,
        gid TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        type TEXT,
        comment TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS release_group (
        id INTEGER PRIMARY KEY,
        gid TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        type TEXT,
        comment TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS url (
        id INTEGER PRIMARY KEY,
        gid TEXT NOT NULL UNIQUE,
        url TEXT NOT NULL
    )
    "#,
];

const REDIRECT_TABLES: &[&str] = &["artist", "event", "place", "series", "release_group", "url"];

const LINK_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS link_type (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        entity_type0 TEXT NOT NULL,
        entity_type1 TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS link (
        id INTEGER PRIMARY KEY,
        link_type INTEGER NOT NULL REFERENCES link_type(id),
        begin_date TEXT,
        end_date TEXT
    )
    "#,
];

/// Relationship table pairs, alphabetical by convention
const L_TABLE_PAIRS: &[(&str, &str)] = &[
    ("artist", "event"),
    ("artist", "place"),
    ("artist", "series"),
    ("event", "place"),
    ("event", "release_group"),
    ("event", "series"),
    ("event", "url"),
    ("place", "url"),
    ("release_group", "series"),
    ("series", "url"),
];

/// Create all tables and indexes if they don't exist. Idempotent.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    for ddl in ENTITY_TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }

    for entity in REDIRECT_TABLES {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {entity}_gid_redirect (
                gid TEXT PRIMARY KEY,
                new_id INTEGER NOT NULL
            )
            "#
        ))
        .execute(pool)
        .await?;
    }

    for ddl in LINK_TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }

    for (t0, t1) in L_TABLE_PAIRS {
        let table = format!("l_{t0}_{t1}");
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                link INTEGER NOT NULL REFERENCES link(id),
                entity0 INTEGER NOT NULL,
                entity1 INTEGER NOT NULL
            )
            "#
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_entity0 ON {table}(entity0)"
        ))
        .execute(pool)
        .await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_entity1 ON {table}(entity1)"
        ))
        .execute(pool)
        .await?;
    }

    tracing::debug!("Metadata schema initialized");
    Ok(())
}
