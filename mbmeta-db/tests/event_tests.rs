//! Integration tests for the event lookup facade
//!
//! Covers the lookup contract end to end against an in-memory database:
//! single/multiple consistency, redirect handling, include validation
//! ordering, lazy expansion and result-map keying.

use mbmeta_db::error::Error;
use mbmeta_db::event::{fetch_multiple_events, get_event_by_mbid};
use mbmeta_db::schema::initialize_schema;
use sqlx::SqlitePool;

const EVENT_A: &str = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
const EVENT_B: &str = "eeeeeeee-0000-0000-0000-000000000002";
const MERGED_EVENT: &str = "dddddddd-0000-0000-0000-000000000003";
const MISSING: &str = "bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";

/// Schema plus a small event graph:
/// - event 1 (EVENT_A): two artist relationships, one place, one series, one url
/// - event 2 (EVENT_B): no relationships
/// - MERGED_EVENT redirects to event 1
async fn seeded_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    initialize_schema(&pool).await.expect("schema init");

    let statements = [
        format!(
            "INSERT INTO event (id, gid, name, type, cancelled, comment, begin_date, end_date)
             VALUES (1, '{EVENT_A}', 'Tribal Gathering 1997', 'Festival', 0, '', '1997-05-24', '1997-05-24')"
        ),
        format!("INSERT INTO event (id, gid, name) VALUES (2, '{EVENT_B}', 'Unrelated Night')"),
        format!("INSERT INTO event_gid_redirect (gid, new_id) VALUES ('{MERGED_EVENT}', 1)"),
        "INSERT INTO artist (id, gid, name, comment)
         VALUES (10, 'a1a1a1a1-0000-0000-0000-000000000010', 'Orbital', 'electronic duo')"
            .to_string(),
        "INSERT INTO artist (id, gid, name)
         VALUES (11, 'a1a1a1a1-0000-0000-0000-000000000011', 'Daft Punk')"
            .to_string(),
        "INSERT INTO place (id, gid, name)
         VALUES (20, 'b2b2b2b2-0000-0000-0000-000000000020', 'Luton Hoo Estate')"
            .to_string(),
        "INSERT INTO series (id, gid, name)
         VALUES (30, 'c3c3c3c3-0000-0000-0000-000000000030', 'Tribal Gathering')"
            .to_string(),
        "INSERT INTO url (id, gid, url)
         VALUES (40, 'd4d4d4d4-0000-0000-0000-000000000040', 'https://example.org/tg97')"
            .to_string(),
        "INSERT INTO link_type (id, name, entity_type0, entity_type1)
         VALUES (100, 'main performer', 'artist', 'event'),
                (101, 'held at', 'event', 'place'),
                (102, 'part of', 'event', 'series'),
                (103, 'official site', 'event', 'url')"
            .to_string(),
        "INSERT INTO link (id, link_type) VALUES (200, 100), (201, 101), (202, 102), (203, 103)"
            .to_string(),
        // artist sorts before event: artists are entity0, events entity1
        "INSERT INTO l_artist_event (id, link, entity0, entity1) VALUES (1, 200, 10, 1), (2, 200, 11, 1)"
            .to_string(),
        "INSERT INTO l_event_place (id, link, entity0, entity1) VALUES (1, 201, 1, 20)".to_string(),
        "INSERT INTO l_event_series (id, link, entity0, entity1) VALUES (1, 202, 1, 30)".to_string(),
        "INSERT INTO l_event_url (id, link, entity0, entity1) VALUES (1, 203, 1, 40)".to_string(),
    ];
    for statement in &statements {
        sqlx::query(statement).execute(&pool).await.expect("seed");
    }

    pool
}

#[tokio::test]
async fn test_get_by_mbid_matches_fetch_multiple() {
    let pool = seeded_pool().await;

    let single = get_event_by_mbid(&pool, EVENT_A, &["artist-rels"])
        .await
        .expect("single lookup");
    let multiple = fetch_multiple_events(&pool, &[EVENT_A], &["artist-rels"])
        .await
        .expect("batch lookup");

    assert_eq!(single.as_ref(), multiple.get(EVENT_A));
    assert!(single.is_some());
}

#[tokio::test]
async fn test_result_keys_are_subset_of_input() {
    let pool = seeded_pool().await;

    let results = fetch_multiple_events(&pool, &[EVENT_A, EVENT_B, MISSING], &[])
        .await
        .expect("batch lookup");

    assert_eq!(results.len(), 2);
    assert!(results.contains_key(EVENT_A));
    assert!(results.contains_key(EVENT_B));
    assert!(!results.contains_key(MISSING));
}

#[tokio::test]
async fn test_concrete_scenario_two_artist_rels_and_one_miss() {
    let pool = seeded_pool().await;

    let results = fetch_multiple_events(&pool, &[EVENT_A, MISSING], &["artist-rels"])
        .await
        .expect("batch lookup");

    assert_eq!(results.len(), 1);
    let event = &results[EVENT_A];
    let rels = event["artist-rels"].as_array().expect("artist-rels list");
    assert_eq!(rels.len(), 2);
    assert_eq!(rels[0]["type"], "main performer");
    assert_eq!(rels[0]["direction"], "backward");
    assert_eq!(rels[0]["artist"]["name"], "Orbital");
    assert_eq!(rels[0]["artist"]["comment"], "electronic duo");
    assert_eq!(rels[1]["artist"]["name"], "Daft Punk");
}

#[tokio::test]
async fn test_invalid_include_fails_before_any_query() {
    // No schema here: a query against this pool would fail with a
    // Database error, so getting InvalidInclude proves validation ran first.
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory database");

    let err = fetch_multiple_events(&pool, &[EVENT_A], &["bogus-rels"])
        .await
        .expect_err("bogus include must fail");
    match err {
        Error::InvalidInclude(msg) => assert!(msg.contains("bogus-rels")),
        other => panic!("expected InvalidInclude, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unrequested_relations_are_not_expanded() {
    let pool = seeded_pool().await;

    let results = fetch_multiple_events(&pool, &[EVENT_A], &["place-rels"])
        .await
        .expect("batch lookup");
    let event = &results[EVENT_A];

    // relationships exist in the database but only the requested category
    // appears, and categories with no rows are absent rather than empty
    assert!(event.get("artist-rels").is_none());
    assert!(event.get("url-rels").is_none());
    assert_eq!(event["place-rels"][0]["place"]["name"], "Luton Hoo Estate");
    assert_eq!(event["place-rels"][0]["direction"], "forward");
}

#[tokio::test]
async fn test_includes_are_monotonic() {
    let pool = seeded_pool().await;

    let narrow = fetch_multiple_events(&pool, &[EVENT_A], &["artist-rels"])
        .await
        .expect("narrow lookup");
    let wide = fetch_multiple_events(&pool, &[EVENT_A], &["artist-rels", "series-rels"])
        .await
        .expect("wide lookup");

    let narrow_event = narrow[EVENT_A].as_object().unwrap();
    let wide_event = wide[EVENT_A].as_object().unwrap();
    for key in narrow_event.keys() {
        assert!(wide_event.contains_key(key), "missing key {key}");
    }
    assert_eq!(narrow_event["artist-rels"], wide_event["artist-rels"]);
    assert!(wide_event.contains_key("series-rels"));
}

#[tokio::test]
async fn test_redirect_keeps_requested_key_and_canonical_payload() {
    let pool = seeded_pool().await;

    let results = fetch_multiple_events(&pool, &[MERGED_EVENT], &["url-rels"])
        .await
        .expect("batch lookup");

    let event = &results[MERGED_EVENT];
    assert_eq!(event["mbid"], EVENT_A, "payload carries the canonical MBID");
    assert_eq!(event["name"], "Tribal Gathering 1997");
    // relationships resolve against the canonical row
    assert_eq!(event["url-rels"][0]["url"]["url"], "https://example.org/tg97");
}

#[tokio::test]
async fn test_redirect_and_canonical_requested_together() {
    let pool = seeded_pool().await;

    let results = fetch_multiple_events(&pool, &[MERGED_EVENT, EVENT_A], &["artist-rels"])
        .await
        .expect("batch lookup");

    assert_eq!(results.len(), 2);
    assert_eq!(results[MERGED_EVENT], results[EVENT_A]);
}

#[tokio::test]
async fn test_entity_without_relationships_serializes_bare() {
    let pool = seeded_pool().await;

    let event = get_event_by_mbid(&pool, EVENT_B, &["artist-rels"])
        .await
        .expect("lookup")
        .expect("event exists");

    assert_eq!(event["name"], "Unrelated Night");
    assert!(event.get("artist-rels").is_none());
    assert!(event.get("life-span").is_none());
}
