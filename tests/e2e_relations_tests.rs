//! End-to-end tests for instrument relation writes
//!
//! Covers link creation, cache propagation, master collapse and removal.

mod common;

use common::*;
use instrument_catalog_server::catalog_store::CatalogStore;
use instrument_catalog_server::notifications::CatalogChangeKind;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn artist_instruments(server: &TestServer, id: &str) -> Vec<String> {
    server
        .catalog_store
        .get_artist(id)
        .unwrap()
        .expect("artist fixture missing")
        .instruments
}

fn album_instruments(server: &TestServer, id: &str) -> Vec<String> {
    server
        .catalog_store
        .get_album(id)
        .unwrap()
        .expect("album fixture missing")
        .instruments
}

// =============================================================================
// Artist Relations
// =============================================================================

#[tokio::test]
async fn test_add_artist_relation_links_and_caches() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    let response = client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, Some("1974-1981"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));

    assert_eq!(
        artist_instruments(&server, ARTIST_KRAFTWERK_ID),
        vec![INSTRUMENT_1_ID]
    );

    let relations = client.relations_json(INSTRUMENT_1_ID).await;
    let artists = relations["artists"].as_array().unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0]["artist_id"], ARTIST_KRAFTWERK_ID);
    assert_eq!(artists[0]["years_used"], "1974-1981");
    assert_eq!(artists[0]["created_by"], CURATOR_USER);
    assert_eq!(artists[0]["is_verified"], false);
}

#[tokio::test]
async fn test_admin_links_are_verified() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_admin(server.base_url.clone());

    let response = client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let relations = client.relations_json(INSTRUMENT_1_ID).await;
    assert_eq!(relations["artists"][0]["is_verified"], true);
    assert_eq!(relations["artists"][0]["created_by"], ADMIN_USER);
}

#[tokio::test]
async fn test_add_artist_relation_twice_updates_in_place() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, None, Some("first"))
        .await;
    let response = client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, None, Some("second"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(server.catalog_store.get_artist_links_count(), 1);
    assert_eq!(
        artist_instruments(&server, ARTIST_KRAFTWERK_ID),
        vec![INSTRUMENT_1_ID]
    );
    let relations = client.relations_json(INSTRUMENT_1_ID).await;
    assert_eq!(relations["artists"][0]["notes"], "second");
}

#[tokio::test]
async fn test_add_artist_relation_unknown_artist() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    let response = client
        .add_artist_relation(INSTRUMENT_1_ID, "no-such-artist", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "success": false, "error": "Artist not found in metadata" })
    );

    assert_eq!(server.catalog_store.get_artist_links_count(), 0);
    assert!(artist_instruments(&server, ARTIST_KRAFTWERK_ID).is_empty());
}

#[tokio::test]
async fn test_remove_artist_relation_clears_cache() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, None, None)
        .await;
    let relation_id = server
        .catalog_store
        .find_artist_link(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_ID)
        .unwrap()
        .unwrap()
        .id;

    let response = client
        .remove_artist_relation(INSTRUMENT_1_ID, &relation_id)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(server.catalog_store.get_artist_links_count(), 0);
    assert!(artist_instruments(&server, ARTIST_KRAFTWERK_ID).is_empty());
}

#[tokio::test]
async fn test_remove_keeps_other_instruments_in_cache() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, None, None)
        .await;
    client
        .add_artist_relation(INSTRUMENT_2_ID, ARTIST_KRAFTWERK_SLUG, None, None)
        .await;
    let relation_id = server
        .catalog_store
        .find_artist_link(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_ID)
        .unwrap()
        .unwrap()
        .id;

    client
        .remove_artist_relation(INSTRUMENT_1_ID, &relation_id)
        .await;

    assert_eq!(
        artist_instruments(&server, ARTIST_KRAFTWERK_ID),
        vec![INSTRUMENT_2_ID]
    );
}

#[tokio::test]
async fn test_remove_unknown_relation_is_a_no_op() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    let response = client
        .remove_artist_relation(INSTRUMENT_1_ID, "missing-relation")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_remove_relation_of_other_instrument_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, None, None)
        .await;
    let relation_id = server
        .catalog_store
        .find_artist_link(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_ID)
        .unwrap()
        .unwrap()
        .id;

    let response = client
        .remove_artist_relation(INSTRUMENT_2_ID, &relation_id)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Relation belongs to another instrument");

    assert_eq!(server.catalog_store.get_artist_links_count(), 1);
    assert_eq!(
        artist_instruments(&server, ARTIST_KRAFTWERK_ID),
        vec![INSTRUMENT_1_ID]
    );
}

#[tokio::test]
async fn test_blank_instrument_id_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    let response = client
        .add_artist_relation("%20", ARTIST_KRAFTWERK_SLUG, None, None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.catalog_store.get_artist_links_count(), 0);
}

// =============================================================================
// Album Relations
// =============================================================================

#[tokio::test]
async fn test_add_album_relation_on_version_targets_master() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    let response = client
        .add_album_relation(INSTRUMENT_1_ID, ALBUM_VERSION_ID, Some("lead synth"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let relations = client.relations_json(INSTRUMENT_1_ID).await;
    let albums = relations["albums"].as_array().unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0]["album_id"], ALBUM_MASTER_ID);
    assert_eq!(albums[0]["notes"], "lead synth");

    assert_eq!(
        album_instruments(&server, ALBUM_MASTER_ID),
        vec![INSTRUMENT_1_ID]
    );
    assert!(album_instruments(&server, ALBUM_VERSION_ID).is_empty());
}

#[tokio::test]
async fn test_add_album_relation_links_album_artist() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_album_relation(INSTRUMENT_1_ID, ALBUM_MASTER_ID, None)
        .await;

    let relations = client.relations_json(INSTRUMENT_1_ID).await;
    let artists = relations["artists"].as_array().unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0]["artist_id"], ARTIST_KRAFTWERK_ID);
    assert_eq!(artists[0]["created_by"], "system");
    assert_eq!(artists[0]["is_verified"], false);
    assert_eq!(
        artists[0]["notes"],
        format!("Automated from album: {}", ALBUM_MASTER_TITLE)
    );
    assert_eq!(
        artist_instruments(&server, ARTIST_KRAFTWERK_ID),
        vec![INSTRUMENT_1_ID]
    );
}

#[tokio::test]
async fn test_album_relation_updates_existing_artist_link() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_artist_relation(INSTRUMENT_1_ID, ARTIST_KRAFTWERK_SLUG, None, Some("curated"))
        .await;
    client
        .add_album_relation(INSTRUMENT_1_ID, ALBUM_MASTER_ID, None)
        .await;

    let relations = client.relations_json(INSTRUMENT_1_ID).await;
    assert_eq!(relations["artists"].as_array().unwrap().len(), 1);
    assert_eq!(
        relations["artists"][0]["notes"],
        format!("Automated from album: {}", ALBUM_MASTER_TITLE)
    );
    // the pair keeps whoever created it first
    assert_eq!(relations["artists"][0]["created_by"], CURATOR_USER);
    assert_eq!(
        artist_instruments(&server, ARTIST_KRAFTWERK_ID),
        vec![INSTRUMENT_1_ID]
    );
}

#[tokio::test]
async fn test_album_without_known_artist_links_no_artist() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    let response = client
        .add_album_relation(INSTRUMENT_1_ID, ALBUM_UNKNOWN_ARTIST_ID, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(server.catalog_store.get_album_links_count(), 1);
    assert_eq!(server.catalog_store.get_artist_links_count(), 0);
}

#[tokio::test]
async fn test_add_album_relation_unknown_album() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    let response = client
        .add_album_relation(INSTRUMENT_1_ID, "no-such-album", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "Album not found" }));
    assert_eq!(server.catalog_store.get_album_links_count(), 0);
}

#[tokio::test]
async fn test_remove_album_relation_keeps_derived_artist_link() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_album_relation(INSTRUMENT_1_ID, ALBUM_VERSION_ID, None)
        .await;
    let relation_id = server
        .catalog_store
        .list_album_links_for_instrument(INSTRUMENT_1_ID)
        .unwrap()[0]
        .id
        .clone();

    let response = client
        .remove_album_relation(INSTRUMENT_1_ID, &relation_id)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(server.catalog_store.get_album_links_count(), 0);
    assert!(album_instruments(&server, ALBUM_MASTER_ID).is_empty());
    assert_eq!(server.catalog_store.get_artist_links_count(), 1);
    assert_eq!(
        artist_instruments(&server, ARTIST_KRAFTWERK_ID),
        vec![INSTRUMENT_1_ID]
    );
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_writes_emit_change_notifications() {
    let mut server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_album_relation(INSTRUMENT_1_ID, ALBUM_MASTER_ID, None)
        .await;

    let kinds: Vec<CatalogChangeKind> = server.drain_changes().into_iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CatalogChangeKind::AlbumRelationAdded,
            CatalogChangeKind::ArtistRelationAdded
        ]
    );
}

#[tokio::test]
async fn test_failed_writes_emit_nothing() {
    let mut server = TestServer::spawn().await;
    let client = TestClient::authenticated_curator(server.base_url.clone());

    client
        .add_artist_relation(INSTRUMENT_1_ID, "no-such-artist", None, None)
        .await;

    assert!(server.drain_changes().is_empty());
}
