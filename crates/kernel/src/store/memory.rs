//! In-process catalogue engine.
//!
//! Rows live in plain vectors behind a `parking_lot::RwLock`. Review writes
//! are staged inside the transaction and applied in one step on commit, so
//! an uncommitted transaction is never visible. Per-product serialization
//! uses an async mutex per existing product id, held for the life of the
//! transaction and forgotten once no transaction holds or awaits it.

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{CatalogStore, ReviewTransaction};
use crate::listing::{OrderBy, Predicate, Record, SortDirection};
use crate::models::{Product, RatingAggregate, Review, ReviewStats};

#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    reviews: Vec<Review>,
}

#[derive(Default)]
struct Inner {
    tables: RwLock<Tables>,
    product_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    offline: AtomicBool,
}

/// In-memory [`CatalogStore`].
///
/// Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product row as-is.
    pub fn insert_product(&self, product: Product) {
        self.inner.tables.write().products.push(product);
    }

    /// Seed a review row as-is. The product aggregate is not touched.
    pub fn insert_review(&self, review: Review) {
        self.inner.tables.write().reviews.push(review);
    }

    pub fn review_count(&self) -> usize {
        self.inner.tables.read().reviews.len()
    }

    /// Simulate an unreachable engine: every operation fails until cleared.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, AtomicOrdering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.inner.offline.load(AtomicOrdering::SeqCst) {
            bail!("memory store is offline");
        }
        Ok(())
    }

    fn product_exists(&self, id: Uuid) -> bool {
        self.inner.tables.read().products.iter().any(|p| p.id == id)
    }

    fn product_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.inner.product_locks.entry(id).or_default().clone()
    }
}

/// Product locks held by one transaction.
///
/// Dropping releases every guard, then removes map entries that only the
/// map still references.
struct HeldLocks {
    inner: Arc<Inner>,
    guards: Vec<(Uuid, OwnedMutexGuard<()>)>,
}

impl Drop for HeldLocks {
    fn drop(&mut self) {
        for (id, guard) in self.guards.drain(..) {
            drop(guard);
            self.inner
                .product_locks
                .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

/// Filter, order, and limit rows the way the SQL engine would.
fn select<R: Record>(rows: &[R], filter: &Predicate, order: &[OrderBy], limit: u64) -> Vec<R> {
    let mut matched: Vec<R> = rows.iter().filter(|r| filter.matches(*r)).cloned().collect();

    matched.sort_by(|a, b| {
        order
            .iter()
            .map(|term| {
                let ordering = match (a.value(term.column), b.value(term.column)) {
                    (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                match term.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    matched.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    matched
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn query_products(
        &self,
        filter: &Predicate,
        order: &[OrderBy],
        limit: u64,
    ) -> Result<Vec<Product>> {
        self.ensure_online()?;
        let tables = self.inner.tables.read();
        Ok(select(&tables.products, filter, order, limit))
    }

    async fn query_reviews(
        &self,
        filter: &Predicate,
        order: &[OrderBy],
        limit: u64,
    ) -> Result<Vec<Review>> {
        self.ensure_online()?;
        let tables = self.inner.tables.read();
        Ok(select(&tables.reviews, filter, order, limit))
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        self.ensure_online()?;
        let tables = self.inner.tables.read();
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn aggregate_reviews(&self, filter: &Predicate) -> Result<ReviewStats> {
        self.ensure_online()?;
        let tables = self.inner.tables.read();
        let (count, sum) = tables
            .reviews
            .iter()
            .filter(|r| filter.matches(*r))
            .fold((0_i64, 0_i64), |(count, sum), r| {
                (count + 1, sum + i64::from(r.rating))
            });

        let average = if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        };
        Ok(ReviewStats { count, average })
    }

    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>> {
        self.ensure_online()?;
        Ok(Box::new(MemoryReviewTx {
            store: self.clone(),
            locks: HeldLocks {
                inner: self.inner.clone(),
                guards: Vec::new(),
            },
            reviews: Vec::new(),
            aggregates: Vec::new(),
        }))
    }

    async fn healthy(&self) -> bool {
        self.ensure_online().is_ok()
    }
}

/// Staged review write against a [`MemoryStore`].
struct MemoryReviewTx {
    store: MemoryStore,
    locks: HeldLocks,
    reviews: Vec<Review>,
    aggregates: Vec<(Uuid, RatingAggregate)>,
}

#[async_trait]
impl ReviewTransaction for MemoryReviewTx {
    async fn lock_product(&mut self, product_id: Uuid) -> Result<Option<RatingAggregate>> {
        self.store.ensure_online()?;

        // Products are never removed, so a missing id needs no lock.
        if !self.store.product_exists(product_id) {
            return Ok(None);
        }

        let lock = self.store.product_lock(product_id);
        let guard = lock.lock_owned().await;
        self.locks.guards.push((product_id, guard));

        let tables = self.store.inner.tables.read();
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| RatingAggregate {
                review_count: p.review_count,
                average_rating: p.average_rating,
            }))
    }

    async fn insert_review(&mut self, review: &Review) -> Result<()> {
        self.store.ensure_online()?;

        if !self.store.product_exists(review.product_id) {
            bail!("review references missing product {}", review.product_id);
        }

        self.reviews.push(review.clone());
        Ok(())
    }

    async fn update_aggregate(
        &mut self,
        product_id: Uuid,
        aggregate: RatingAggregate,
    ) -> Result<()> {
        self.store.ensure_online()?;
        self.aggregates.push((product_id, aggregate));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.store.ensure_online()?;

        let this = *self;
        let mut tables = this.store.inner.tables.write();
        tables.reviews.extend(this.reviews);
        for (product_id, aggregate) in this.aggregates {
            if let Some(product) = tables.products.iter_mut().find(|p| p.id == product_id) {
                product.review_count = aggregate.review_count;
                product.average_rating = aggregate.average_rating;
            }
        }
        drop(tables);
        // Locks are released only after the writes are visible.
        drop(this.locks);
        Ok(())
    }
}
