//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per catalog server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client sending a fixed API token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    token: Option<String>,
}

impl TestClient {
    fn with_token(base_url: String, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: token.map(str::to_string),
        }
    }

    /// Creates a client that sends no token
    pub fn new(base_url: String) -> Self {
        Self::with_token(base_url, None)
    }

    /// Creates a client acting as a regular (read-only) user
    pub fn authenticated(base_url: String) -> Self {
        Self::with_token(base_url, Some(REGULAR_TOKEN))
    }

    /// Creates a client acting as a curator
    pub fn authenticated_curator(base_url: String) -> Self {
        Self::with_token(base_url, Some(CURATOR_TOKEN))
    }

    /// Creates a client acting as an admin
    pub fn authenticated_admin(base_url: String) -> Self {
        Self::with_token(base_url, Some(ADMIN_TOKEN))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(builder: reqwest::RequestBuilder) -> Response {
        builder.send().await.expect("Request failed")
    }

    // ========================================================================
    // Catalog Endpoints
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/")).await
    }

    pub async fn get_artist(&self, slug: &str) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/v1/artist/{}", slug))).await
    }

    pub async fn get_album(&self, id: &str) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/v1/album/{}", id))).await
    }

    // ========================================================================
    // Relation Endpoints
    // ========================================================================

    pub async fn add_artist_relation(
        &self,
        instrument_id: &str,
        artist_key: &str,
        years_used: Option<&str>,
        notes: Option<&str>,
    ) -> Response {
        Self::send(
            self.request(
                reqwest::Method::POST,
                &format!("/v1/instrument/{}/artists", instrument_id),
            )
            .json(&json!({
                "artist_key": artist_key,
                "years_used": years_used,
                "notes": notes,
            })),
        )
        .await
    }

    pub async fn remove_artist_relation(&self, instrument_id: &str, relation_id: &str) -> Response {
        Self::send(self.request(
            reqwest::Method::DELETE,
            &format!("/v1/instrument/{}/artists/{}", instrument_id, relation_id),
        ))
        .await
    }

    pub async fn add_album_relation(
        &self,
        instrument_id: &str,
        album_id: &str,
        notes: Option<&str>,
    ) -> Response {
        Self::send(
            self.request(
                reqwest::Method::POST,
                &format!("/v1/instrument/{}/albums", instrument_id),
            )
            .json(&json!({
                "album_id": album_id,
                "notes": notes,
            })),
        )
        .await
    }

    pub async fn remove_album_relation(&self, instrument_id: &str, relation_id: &str) -> Response {
        Self::send(self.request(
            reqwest::Method::DELETE,
            &format!("/v1/instrument/{}/albums/{}", instrument_id, relation_id),
        ))
        .await
    }

    pub async fn get_relations(&self, instrument_id: &str) -> Response {
        Self::send(self.request(
            reqwest::Method::GET,
            &format!("/v1/instrument/{}/relations", instrument_id),
        ))
        .await
    }

    /// Fetches relations and returns the parsed body, asserting success.
    pub async fn relations_json(&self, instrument_id: &str) -> Value {
        let response = self.get_relations(instrument_id).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Invalid relations body")
    }

    // ========================================================================
    // Admin Endpoints
    // ========================================================================

    pub async fn repair_catalog(&self) -> Response {
        Self::send(self.request(reqwest::Method::POST, "/v1/admin/catalog/repair")).await
    }
}
