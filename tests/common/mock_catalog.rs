//! Local stand-in for the bibliographic catalog and cover image service.

use super::constants::*;
use super::fixtures::TINY_JPEG;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Running mock catalog. The server task lives as long as the test runtime.
pub struct MockCatalog {
    pub base_url: String,
    lookups: Arc<AtomicUsize>,
}

impl MockCatalog {
    pub async fn spawn() -> Self {
        let lookups = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/volumes", get(volumes))
            .route("/b/isbn/{file}", get(cover))
            .with_state(lookups.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock catalog");
        let addr = listener.local_addr().expect("Failed to get mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock catalog failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            lookups,
        }
    }

    /// Number of ISBN lookups received so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

async fn volumes(
    State(lookups): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    lookups.fetch_add(1, Ordering::SeqCst);

    let query = params.get("q").map(String::as_str).unwrap_or("");
    if query != format!("isbn:{}", KNOWN_ISBN) {
        return Json(json!({ "totalItems": 0 })).into_response();
    }

    Json(json!({
        "totalItems": 1,
        "items": [{
            "volumeInfo": {
                "title": "Effective Testing",
                "subtitle": "A Field Guide",
                "authors": [KNOWN_AUTHOR],
                "publisher": KNOWN_PUBLISHER,
                "publishedDate": "2016-05-01",
                "description": "How to test things.",
                "pageCount": 320,
                "categories": ["Computers"],
                "industryIdentifiers": [
                    {"type": "ISBN_10", "identifier": "0134190440"},
                    {"type": "ISBN_13", "identifier": KNOWN_ISBN}
                ],
                "averageRating": 4.5,
                "ratingsCount": 12
            }
        }]
    }))
    .into_response()
}

async fn cover() -> impl IntoResponse {
    ([("content-type", "image/jpeg")], TINY_JPEG.to_vec())
}
