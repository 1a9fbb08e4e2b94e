//! Catalogue models.

pub mod product;
pub mod review;

pub use product::{Product, ProductView, RatingAggregate, ReviewStats};
pub use review::{NewReview, Review};
