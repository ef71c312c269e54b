//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all bookshelf-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use bookshelf_server::auth::issue_token;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with bearer-token authentication
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client that sends a valid token for the test user
    pub fn authenticated(base_url: String) -> Self {
        Self::with_token(base_url, &Self::test_user_token())
    }

    /// Creates a client that sends the given bearer token on every request
    pub fn with_token(base_url: String, token: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid token header"),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// A token for the test user, signed with the test server's secret
    pub fn test_user_token() -> String {
        issue_token(
            TEST_JWT_SECRET,
            TEST_USER_ID,
            TEST_USER_EMAIL,
            chrono::Duration::hours(1),
        )
        .expect("Failed to issue test token")
    }

    // ========================================================================
    // Server
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Upload
    // ========================================================================

    /// POST /v1/upload with a single `file` part
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>, content_type: &str) -> Response {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .expect("Invalid content type");
        let form = Form::new().part("file", part);
        self.upload_form(form).await
    }

    /// POST /v1/upload with an arbitrary multipart form
    pub async fn upload_form(&self, form: Form) -> Response {
        self.client
            .post(format!("{}/v1/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    // ========================================================================
    // Books
    // ========================================================================

    /// GET /v1/books
    pub async fn list_books(&self) -> Response {
        self.client
            .get(format!("{}/v1/books", self.base_url))
            .send()
            .await
            .expect("List books request failed")
    }

    /// GET /v1/books/{id}
    pub async fn get_book(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/books/{}", self.base_url, id))
            .send()
            .await
            .expect("Get book request failed")
    }

    /// GET /v1/books/{id}/cover
    pub async fn get_cover(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/books/{}/cover", self.base_url, id))
            .send()
            .await
            .expect("Get cover request failed")
    }

    /// GET /v1/books/{id}/file
    pub async fn get_file(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/books/{}/file", self.base_url, id))
            .send()
            .await
            .expect("Get file request failed")
    }

    /// POST /v1/books/{id}/metadata
    pub async fn refresh_metadata(&self, id: &str, isbn: Option<&str>) -> Response {
        let request = self
            .client
            .post(format!("{}/v1/books/{}/metadata", self.base_url, id));
        let request = match isbn {
            Some(isbn) => request.json(&json!({ "isbn": isbn })),
            None => request,
        };
        request.send().await.expect("Refresh metadata request failed")
    }

    /// DELETE /v1/books/{id}
    pub async fn delete_book(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/v1/books/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete book request failed")
    }
}
