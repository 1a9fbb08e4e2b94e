//! Catalogue storage abstraction.
//!
//! Every read and write the listing engine and the review coordinator make
//! goes through [`CatalogStore`]. Two engines implement it:
//!
//! - [`PgStore`]: PostgreSQL via sqlx, SELECTs generated with SeaQuery
//! - [`MemoryStore`]: in-process tables, used by tests and `STORE_BACKEND=memory`
//!
//! Both honour the same ordering and locking contract, so listing and
//! aggregate behaviour is identical regardless of the engine.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::listing::{OrderBy, Predicate};
use crate::models::{Product, RatingAggregate, Review, ReviewStats};

/// Read and transactional write access to products and reviews.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Products matching `filter`, ordered by `order`, at most `limit` rows.
    async fn query_products(
        &self,
        filter: &Predicate,
        order: &[OrderBy],
        limit: u64,
    ) -> Result<Vec<Product>>;

    /// Reviews matching `filter`, ordered by `order`, at most `limit` rows.
    async fn query_reviews(
        &self,
        filter: &Predicate,
        order: &[OrderBy],
        limit: u64,
    ) -> Result<Vec<Review>>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;

    /// Count and mean rating of the reviews matching `filter`.
    async fn aggregate_reviews(&self, filter: &Predicate) -> Result<ReviewStats>;

    /// Start a review write transaction.
    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>>;

    /// Whether the engine can currently serve requests.
    async fn healthy(&self) -> bool;
}

/// A unit of work inserting one review and updating its product aggregate.
///
/// Dropping the transaction without calling [`commit`](Self::commit) rolls
/// everything back.
#[async_trait]
pub trait ReviewTransaction: Send {
    /// Lock the product row for the rest of the transaction and return its
    /// current aggregate, or `None` if the product does not exist.
    async fn lock_product(&mut self, product_id: Uuid) -> Result<Option<RatingAggregate>>;

    async fn insert_review(&mut self, review: &Review) -> Result<()>;

    async fn update_aggregate(
        &mut self,
        product_id: Uuid,
        aggregate: RatingAggregate,
    ) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
