//! Product model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::format::PriceFormatter;
use crate::listing::{Column, Record, SqlValue};

/// Product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Unique identifier (UUIDv7). Also the pagination tiebreaker.
    pub id: Uuid,

    pub name: String,

    pub description: String,

    pub category: String,

    /// Unit price in the store currency.
    pub price: f64,

    pub image_url: Option<String>,

    /// Mean review rating, rounded to two decimals. Maintained on write.
    pub average_rating: f64,

    /// Number of accepted reviews. Maintained on write.
    pub review_count: i32,

    pub created_at: DateTime<Utc>,
}

impl Record for Product {
    fn id(&self) -> Uuid {
        self.id
    }

    fn value(&self, column: Column) -> Option<SqlValue> {
        match column {
            Column::ProductId => Some(SqlValue::Uuid(self.id)),
            Column::ProductName => Some(SqlValue::Text(self.name.clone())),
            Column::ProductCategory => Some(SqlValue::Text(self.category.clone())),
            Column::ProductPrice => Some(SqlValue::Float(self.price)),
            Column::ProductAverageRating => Some(SqlValue::Float(self.average_rating)),
            _ => None,
        }
    }
}

/// Product as served by the JSON API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub display_price: String,
    pub image_url: Option<String>,
    pub average_rating: f64,
    pub review_count: i32,
}

impl ProductView {
    pub fn new(product: Product, formatter: &PriceFormatter) -> Self {
        Self {
            display_price: formatter.format(product.price),
            id: product.id,
            name: product.name,
            description: product.description,
            category: product.category,
            price: product.price,
            image_url: product.image_url,
            average_rating: product.average_rating,
            review_count: product.review_count,
        }
    }
}

/// Denormalized review statistics stored on the product row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingAggregate {
    pub review_count: i32,
    pub average_rating: f64,
}

impl RatingAggregate {
    /// Fold one more rating into the aggregate.
    ///
    /// The new average is rounded to two decimals, the same precision the
    /// listing sorts on.
    pub fn with_rating(self, rating: i16) -> Self {
        let count = f64::from(self.review_count);
        let review_count = self.review_count + 1;
        let average = (self.average_rating * count + f64::from(rating)) / f64::from(review_count);
        Self {
            review_count,
            average_rating: round2(average),
        }
    }
}

/// Live review statistics computed from the review table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReviewStats {
    #[serde(rename = "reviewCount")]
    pub count: i64,
    #[serde(rename = "avgRating")]
    pub average: f64,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
