#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Keyset pagination over the real listing routes.
//!
//! Every test builds its own application over an in-memory store seeded
//! from the deterministic catalogue generator.

use std::cmp::Ordering;
use std::collections::HashSet;

use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use vitrine_kernel::listing::{CursorValue, decode_cursor};
use vitrine_test_utils::{CatalogueGenerator, TestProduct, test_product, test_review};

mod common;
use common::{TestApp, item_ids};

fn seeded_app(per_category: usize) -> (TestApp, Vec<TestProduct>) {
    let app = TestApp::new();
    let products = CatalogueGenerator::new(42).products(per_category);
    app.seed_products(products.clone());
    (app, products)
}

fn all_items(pages: &[Value]) -> Vec<Value> {
    pages
        .iter()
        .flat_map(|p| p["items"].as_array().unwrap().clone())
        .collect()
}

fn sort_value(item: &Value, sort: &str) -> Value {
    match sort {
        "price" => item["price"].clone(),
        "rating" => item["averageRating"].clone(),
        "name" => item["name"].clone(),
        other => panic!("unknown sort {other}"),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().unwrap().partial_cmp(&y.as_f64().unwrap()).unwrap()
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => panic!("incomparable {a} and {b}"),
    }
}

fn item_uuid(item: &Value) -> Uuid {
    Uuid::parse_str(item["id"].as_str().unwrap()).unwrap()
}

/// Assert that `items` are strictly ordered by `(sort value, id)`.
fn assert_keyset_order(items: &[Value], sort: &str, dir: &str) {
    for pair in items.windows(2) {
        let ordering = compare_values(&sort_value(&pair[0], sort), &sort_value(&pair[1], sort))
            .then_with(|| item_uuid(&pair[0]).cmp(&item_uuid(&pair[1])));
        let expected = if dir == "asc" {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        assert_eq!(ordering, expected, "{sort} {dir}: {} then {}", pair[0], pair[1]);
    }
}

#[tokio::test]
async fn every_sort_visits_each_product_exactly_once() {
    let (app, products) = seeded_app(10);

    for sort in ["price", "rating", "name"] {
        for dir in ["asc", "desc"] {
            let pages = app
                .walk(
                    "/api/products",
                    &[("sort", sort), ("dir", dir), ("pageSize", "12")],
                    50,
                )
                .await;
            let items = all_items(&pages);

            assert_eq!(items.len(), products.len(), "{sort} {dir}");
            let unique: HashSet<Uuid> = items.iter().map(item_uuid).collect();
            assert_eq!(unique.len(), products.len(), "{sort} {dir}: duplicates");
            assert_keyset_order(&items, sort, dir);

            for page in &pages[..pages.len() - 1] {
                assert_eq!(page["items"].as_array().unwrap().len(), 12);
            }
        }
    }
}

#[tokio::test]
async fn ties_split_across_pages_by_id() {
    let app = TestApp::new();
    let ties = CatalogueGenerator::new(5).price_ties("Books", 10.0, 30);
    app.seed_products(ties.clone());

    let pages = app
        .walk(
            "/api/products",
            &[("sort", "price"), ("dir", "asc"), ("pageSize", "12")],
            10,
        )
        .await;

    let sizes: Vec<usize> = pages
        .iter()
        .map(|p| p["items"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![12, 12, 6]);

    let mut expected: Vec<Uuid> = ties.iter().map(|p| p.id).collect();
    expected.sort();
    let actual: Vec<Uuid> = all_items(&pages).iter().map(item_uuid).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn cheapest_books_first_page() {
    let (app, products) = seeded_app(20);

    let (status, page) = app
        .get_listing(
            "/api/products",
            &[
                ("category", "Books"),
                ("sort", "price"),
                ("dir", "asc"),
                ("pageSize", "12"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut books: Vec<&TestProduct> = products.iter().filter(|p| p.category == "Books").collect();
    books.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap().then(a.id.cmp(&b.id)));
    let expected: Vec<String> = books[..12].iter().map(|p| p.id.to_string()).collect();
    assert_eq!(item_ids(&page), expected);

    let cursor = decode_cursor(page["nextCursor"].as_str()).expect("decodable cursor");
    assert_eq!(cursor.value, CursorValue::Number(books[11].price));
    assert_eq!(cursor.id, books[11].id.to_string());
}

#[tokio::test]
async fn category_filter_matches_any_listed_category() {
    let (app, products) = seeded_app(5);

    let pages = app
        .walk(
            "/api/products",
            &[("category", "Books, Toys,,Books"), ("pageSize", "12")],
            10,
        )
        .await;
    let items = all_items(&pages);

    let expected = products
        .iter()
        .filter(|p| p.category == "Books" || p.category == "Toys")
        .count();
    assert_eq!(items.len(), expected);
    assert!(
        items
            .iter()
            .all(|i| i["category"] == "Books" || i["category"] == "Toys")
    );
}

#[tokio::test]
async fn inverted_price_bounds_are_swapped() {
    let (app, _) = seeded_app(20);

    let inverted = app
        .walk(
            "/api/products",
            &[("min", "50"), ("max", "10"), ("sort", "price"), ("dir", "asc")],
            20,
        )
        .await;
    let ordered = app
        .walk(
            "/api/products",
            &[("min", "10"), ("max", "50"), ("sort", "price"), ("dir", "asc")],
            20,
        )
        .await;

    let inverted_items = all_items(&inverted);
    assert!(!inverted_items.is_empty());
    assert_eq!(inverted_items, all_items(&ordered));
    assert!(inverted_items.iter().all(|i| {
        let price = i["price"].as_f64().unwrap();
        (10.0..=50.0).contains(&price)
    }));
}

#[tokio::test]
async fn page_size_is_clamped() {
    let (app, _) = seeded_app(20);

    for (raw, expected) in [("5", 12), ("500", 96), ("24", 24), ("abc", 24), ("36.9", 36)] {
        let (status, page) = app
            .get_listing("/api/products", &[("pageSize", raw)])
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            page["items"].as_array().unwrap().len(),
            expected,
            "pageSize={raw}"
        );
    }
}

#[tokio::test]
async fn unknown_sort_falls_back_to_rating_desc() {
    let (app, _) = seeded_app(3);

    let (_, fallback) = app
        .get_listing("/api/products", &[("sort", "popularity"), ("dir", "sideways")])
        .await;
    let (_, default) = app.get_listing("/api/products", &[]).await;

    assert_eq!(item_ids(&fallback), item_ids(&default));
    let items = fallback["items"].as_array().unwrap();
    assert_keyset_order(items, "rating", "desc");
}

#[tokio::test]
async fn broken_cursor_means_first_page() {
    let (app, _) = seeded_app(5);
    let (_, first) = app.get_listing("/api/products", &[("sort", "name")]).await;

    for garbage in ["%%%", "bm90LWpzb24", "eyJ2Ijp7fSwiaWQiOiJ4In0", "A"] {
        let (status, page) = app
            .get_listing("/api/products", &[("sort", "name"), ("cursor", garbage)])
            .await;
        assert_eq!(status, StatusCode::OK, "cursor={garbage}");
        assert_eq!(item_ids(&page), item_ids(&first), "cursor={garbage}");
    }
}

#[tokio::test]
async fn cursor_from_another_sort_restarts_listing() {
    let (app, _) = seeded_app(5);

    let (_, by_price) = app
        .get_listing("/api/products", &[("sort", "price"), ("dir", "asc")])
        .await;
    let foreign = by_price["nextCursor"].as_str().unwrap().to_string();

    let (_, by_name) = app.get_listing("/api/products", &[("sort", "name")]).await;
    let (status, resumed) = app
        .get_listing(
            "/api/products",
            &[("sort", "name"), ("cursor", foreign.as_str())],
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_ids(&resumed), item_ids(&by_name));
}

#[tokio::test]
async fn last_page_has_null_cursor() {
    let app = TestApp::new();
    app.seed_products((0..5).map(|i| test_product("Home", 20.0 + f64::from(i))));

    let (status, page) = app.get_listing("/api/products", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 5);
    assert!(page["nextCursor"].is_null());
}

#[tokio::test]
async fn empty_catalogue() {
    let app = TestApp::new();
    let (status, page) = app
        .get_listing("/api/products", &[("category", "Nothing")])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["items"].as_array().unwrap().is_empty());
    assert!(page["nextCursor"].is_null());
}

#[tokio::test]
async fn products_carry_display_price() {
    let app = TestApp::new();
    app.seed_products([test_product("Laptops", 1299.5)]);

    let (_, page) = app.get_listing("/api/products", &[]).await;
    assert_eq!(page["items"][0]["displayPrice"], "$1,299.50");
    assert_eq!(page["items"][0]["price"], 1299.5);
}

#[tokio::test]
async fn strict_mode_rejects_bad_input() {
    let app = TestApp::strict();

    let (status, body) = app
        .get_listing(
            "/api/products",
            &[("pageSize", "5"), ("sort", "popularity"), ("min", "50"), ("max", "10")],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation failed");

    let fields: HashSet<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert!(fields.contains("pageSize"));
    assert!(fields.contains("sort"));
    assert!(fields.contains("max"));

    let (status, _) = app
        .get_listing("/api/products", &[("cursor", "garbage")])
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn reviews_walk_newest_first_with_ties() {
    let app = TestApp::new();
    let product = test_product("Books", 12.0);
    let product_id = product.id;
    app.seed_products([product]);

    // Groups of three reviews share a timestamp.
    let base = vitrine_test_utils::epoch();
    let reviews: Vec<_> = (0..25)
        .map(|i| {
            test_review(product_id, 4).created_at(base + chrono::Duration::minutes(i / 3))
        })
        .collect();
    app.seed_reviews(reviews.clone());
    app.seed_reviews([test_review(Uuid::now_v7(), 1)]);

    let id = product_id.to_string();
    let pages = app
        .walk(
            "/api/reviews",
            &[("productId", id.as_str()), ("pageSize", "4")],
            20,
        )
        .await;
    assert_eq!(pages.len(), 7);

    let mut expected = reviews.clone();
    expected.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let expected: Vec<String> = expected.iter().map(|r| r.id.to_string()).collect();
    let actual: Vec<String> = pages.iter().flat_map(item_ids).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn review_listing_requires_product_id() {
    let app = TestApp::new();

    let (status, body) = app.get_listing("/api/reviews", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "productId");

    let (status, _) = app
        .get_listing("/api/reviews", &[("productId", "not-an-id")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_page_size_is_clamped() {
    let app = TestApp::new();
    let product = test_product("Books", 12.0);
    let product_id = product.id;
    app.seed_products([product]);
    app.seed_reviews((0..60).map(|_| test_review(product_id, 5)));

    let id = product_id.to_string();
    for (raw, expected) in [("0", 1), ("500", 50), ("abc", 10)] {
        let (_, page) = app
            .get_listing(
                "/api/reviews",
                &[("productId", id.as_str()), ("pageSize", raw)],
            )
            .await;
        assert_eq!(
            page["items"].as_array().unwrap().len(),
            expected,
            "pageSize={raw}"
        );
    }
}
