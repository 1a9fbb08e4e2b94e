//! Review submission.
//!
//! Accepting a review inserts the review row and folds its rating into the
//! product's denormalized aggregate as one transaction. The product row is
//! locked first, so concurrent submissions for one product apply in sequence
//! while submissions for different products never wait on each other.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewReview, Review};
use crate::store::CatalogStore;
use crate::validation::{ValidationError, Validator, check_length};

pub const AUTHOR_NAME_LENGTH: (usize, usize) = (2, 80);
pub const TITLE_LENGTH: (usize, usize) = (2, 120);
pub const BODY_LENGTH: (usize, usize) = (10, 1000);
pub const RATING_RANGE: (i16, i16) = (1, 5);

/// Review as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    pub product_id: Option<String>,
    pub author_name: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    /// A JSON number or a numeric string.
    pub rating: Option<serde_json::Value>,
}

impl ReviewSubmission {
    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<NewReview, Vec<ValidationError>> {
        let mut v = Validator::new();

        let product_id = match self.product_id.as_deref().map(str::trim) {
            None | Some("") => {
                v.field("productId", "productId is required");
                None
            }
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    v.field("productId", "productId must be a valid id");
                    None
                }
            },
        };

        let (min, max) = AUTHOR_NAME_LENGTH;
        let author_name = check_length(&mut v, "authorName", self.author_name.as_deref(), min, max);
        let (min, max) = TITLE_LENGTH;
        let title = check_length(&mut v, "title", self.title.as_deref(), min, max);
        let (min, max) = BODY_LENGTH;
        let body = check_length(&mut v, "body", self.body.as_deref(), min, max);

        let rating = match self.rating.as_ref().map(parse_rating) {
            None => {
                v.field("rating", "rating is required");
                None
            }
            Some(None) => {
                let (min, max) = RATING_RANGE;
                v.field("rating", format!("rating must be a whole number from {min} to {max}"));
                None
            }
            Some(rating) => rating,
        };

        match (product_id, author_name, title, body, rating) {
            (Some(product_id), Some(author_name), Some(title), Some(body), Some(rating))
                if v.is_empty() =>
            {
                Ok(NewReview {
                    product_id,
                    author_name,
                    title,
                    body,
                    rating,
                })
            }
            _ => Err(v.into_errors()),
        }
    }
}

/// Accept integral numbers (including `4.0`) and numeric strings in range.
fn parse_rating(raw: &serde_json::Value) -> Option<i16> {
    let value = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    let (min, max) = RATING_RANGE;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(min) || value > f64::from(max) {
        return None;
    }
    Some(value as i16)
}

/// Review submission errors.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("validation failed")]
    Validation(Vec<ValidationError>),

    #[error("product not found")]
    ProductNotFound,

    #[error("storage error")]
    Storage(#[from] anyhow::Error),
}

/// Review write service.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn CatalogStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Validate and store a review, updating the product aggregate.
    ///
    /// Validation happens before any storage access. On any failure after
    /// the transaction starts, it is dropped and nothing is written.
    pub async fn submit(&self, submission: ReviewSubmission) -> Result<Review, ReviewError> {
        let new_review = submission.validate().map_err(ReviewError::Validation)?;
        let product_id = new_review.product_id;

        let mut tx = self.store.begin().await?;

        let Some(aggregate) = tx.lock_product(product_id).await? else {
            return Err(ReviewError::ProductNotFound);
        };

        let review = new_review.into_review();
        tx.insert_review(&review).await?;

        let updated = aggregate.with_rating(review.rating);
        tx.update_aggregate(product_id, updated).await?;
        tx.commit().await?;

        info!(
            review_id = %review.id,
            product_id = %product_id,
            rating = review.rating,
            review_count = updated.review_count,
            average_rating = updated.average_rating,
            "review accepted"
        );

        Ok(review)
    }
}
