//! Vitrine test utilities.
//!
//! Helpers for integration testing: product and review fixtures, a
//! deterministic catalogue generator, and JSON assertion utilities.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Catalogue categories with their price ranges.
pub const CATEGORIES: &[(&str, f64, f64)] = &[
    ("Phones", 299.0, 1499.0),
    ("Books", 9.0, 45.0),
    ("Laptops", 499.0, 2999.0),
    ("Home", 15.0, 350.0),
    ("Toys", 5.0, 180.0),
    ("Sports", 25.0, 650.0),
    ("Clothing", 12.0, 420.0),
];

/// Fixed reference time so fixtures are reproducible.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Create a test product with default values.
pub fn test_product(category: &str, price: f64) -> TestProduct {
    TestProduct {
        id: Uuid::now_v7(),
        name: format!("{category} Item"),
        description: format!("A dependable {} product.", category.to_lowercase()),
        category: category.to_string(),
        price,
        image_url: None,
        average_rating: 0.0,
        review_count: 0,
        created_at: epoch(),
    }
}

/// A test product builder.
#[derive(Debug, Clone, PartialEq)]
pub struct TestProduct {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
}

impl TestProduct {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the stored rating aggregate.
    pub fn rated(mut self, average_rating: f64, review_count: i32) -> Self {
        self.average_rating = average_rating;
        self.review_count = review_count;
        self
    }

    /// Set an image URL.
    pub fn with_image(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }
}

/// Create a test review with default values.
pub fn test_review(product_id: Uuid, rating: i16) -> TestReview {
    TestReview {
        id: Uuid::now_v7(),
        product_id,
        author_name: "Test Reviewer".to_string(),
        title: "Test review".to_string(),
        body: "A review written for a test fixture.".to_string(),
        rating,
        created_at: epoch(),
    }
}

/// A test review builder.
#[derive(Debug, Clone, PartialEq)]
pub struct TestReview {
    pub id: Uuid,
    pub product_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

impl TestReview {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the creation time.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Set the author.
    pub fn by(mut self, author_name: &str) -> Self {
        self.author_name = author_name.to_string();
        self
    }
}

/// Deterministic catalogue generator.
///
/// The same seed always yields the same products. Prices are rounded to
/// cents and ratings to one decimal, so large catalogues contain plenty of
/// equal sort values.
pub struct CatalogueGenerator {
    rng: StdRng,
}

impl CatalogueGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn id(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.r#gen()).into_uuid()
    }

    /// `per_category` products for every entry in [`CATEGORIES`].
    pub fn products(&mut self, per_category: usize) -> Vec<TestProduct> {
        let mut products = Vec::with_capacity(per_category * CATEGORIES.len());
        for &(category, min, max) in CATEGORIES {
            for index in 0..per_category {
                let price = (self.rng.gen_range(min..max) * 100.0).round() / 100.0;
                let review_count = self.rng.gen_range(0..=5);
                let average_rating = if review_count == 0 {
                    0.0
                } else {
                    (self.rng.gen_range(1.0..=5.0_f64) * 10.0).round() / 10.0
                };
                products.push(TestProduct {
                    id: self.id(),
                    name: format!("{category} Item {:04}", index + 1),
                    description: format!("{category} model {} for everyday use.", index + 1),
                    category: category.to_string(),
                    price,
                    image_url: Some(format!(
                        "https://picsum.photos/seed/{category}-{index}/640/480"
                    )),
                    average_rating,
                    review_count,
                    created_at: epoch() + Duration::minutes(index as i64),
                });
            }
        }
        products
    }

    /// `count` products in one category that all share `price`.
    pub fn price_ties(&mut self, category: &str, price: f64, count: usize) -> Vec<TestProduct> {
        (0..count)
            .map(|index| {
                test_product(category, price)
                    .with_id(self.id())
                    .named(&format!("{category} Tie {:04}", index + 1))
            })
            .collect()
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value is an array of `len` elements.
    pub fn array_len(value: &Value, len: usize) {
        let actual = value.as_array().map(Vec::len);
        assert_eq!(
            actual,
            Some(len),
            "Expected JSON array of {len} elements, got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
