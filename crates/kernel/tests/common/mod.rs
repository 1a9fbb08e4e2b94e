#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Every [`TestApp`] drives the REAL kernel routes, services, and listing
//! engine over its own in-memory store, so tests are isolated from each
//! other and need no database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use vitrine_kernel::listing::ValidationMode;
use vitrine_kernel::models::{Product, Review};
use vitrine_kernel::store::MemoryStore;
use vitrine_kernel::{AppState, Config, routes};
use vitrine_test_utils::{TestProduct, TestReview};

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub store: MemoryStore,
    pub state: AppState,
}

impl TestApp {
    /// A lenient-mode application over an empty store.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// A strict-mode application over an empty store.
    pub fn strict() -> Self {
        Self::with_config(Config {
            listing_validation: ValidationMode::Strict,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new();
        let state = AppState::with_store(Arc::new(store.clone()), &config);
        let router = routes::router().with_state(state.clone());
        Self {
            router,
            store,
            state,
        }
    }

    pub fn seed_products(&self, products: impl IntoIterator<Item = TestProduct>) {
        for p in products {
            self.store.insert_product(product(p));
        }
    }

    pub fn seed_reviews(&self, reviews: impl IntoIterator<Item = TestReview>) {
        for r in reviews {
            self.store.insert_review(review(r));
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri`, returning the status and decoded JSON body.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .request(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// GET a listing with query parameters.
    pub async fn get_listing(&self, path: &str, params: &[(&str, &str)]) -> (StatusCode, Value) {
        self.get_json(&with_query(path, params)).await
    }

    /// POST a JSON body, returning the status and decoded JSON body.
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    /// POST a raw body labelled as JSON.
    pub async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Value) {
        let response = self
            .request(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// Follow `nextCursor` until the listing is exhausted.
    ///
    /// Returns every page body in order. Panics after `max_pages` pages.
    pub async fn walk(
        &self,
        path: &str,
        params: &[(&str, &str)],
        max_pages: usize,
    ) -> Vec<Value> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query: Vec<(&str, &str)> = params.to_vec();
            if let Some(c) = cursor.as_deref() {
                query.push(("cursor", c));
            }
            let (status, body) = self.get_listing(path, &query).await;
            assert_eq!(status, StatusCode::OK, "{body}");

            cursor = body["nextCursor"].as_str().map(str::to_string);
            pages.push(body);
            if cursor.is_none() {
                return pages;
            }
            assert!(pages.len() < max_pages, "listing did not terminate");
        }
    }
}

/// Decode a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Append URL-encoded query parameters to `path`.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("{path}?{}", query.join("&"))
}

/// Ids of the items on a listing page, in order.
pub fn item_ids(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

pub fn product(p: TestProduct) -> Product {
    Product {
        id: p.id,
        name: p.name,
        description: p.description,
        category: p.category,
        price: p.price,
        image_url: p.image_url,
        average_rating: p.average_rating,
        review_count: p.review_count,
        created_at: p.created_at,
    }
}

pub fn review(r: TestReview) -> Review {
    Review {
        id: r.id,
        product_id: r.product_id,
        author_name: r.author_name,
        title: r.title,
        body: r.body,
        rating: r.rating,
        created_at: r.created_at,
    }
}

/// Query parameters as the normalizer receives them.
pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
