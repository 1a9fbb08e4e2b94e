//! Catalogue listing service.
//!
//! Runs normalized listing requests through the keyset page protocol against
//! the configured [`CatalogStore`].

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use crate::listing::{
    Column, CompareOp, Page, Predicate, QuerySpec, ReviewQuery, SqlValue, assemble_page,
    plan_page,
};
use crate::models::{Product, Review, ReviewStats};
use crate::store::CatalogStore;

/// A product together with statistics computed from its review rows.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub stats: ReviewStats,
}

/// Catalogue read service.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// One page of the catalogue listing.
    pub async fn list_products(&self, spec: &QuerySpec) -> Result<Page<Product>> {
        let scope = spec.scope();
        let plan = plan_page(
            spec.filter.to_predicate(),
            spec.sort,
            spec.cursor.as_ref(),
            spec.page_size,
            &scope,
        );

        let rows = self
            .store
            .query_products(&plan.filter, &plan.order, plan.limit)
            .await?;

        Ok(assemble_page(rows, spec.sort, spec.page_size, &scope))
    }

    /// One page of a product's reviews, newest first.
    pub async fn list_reviews(&self, query: &ReviewQuery) -> Result<Page<Review>> {
        let scope = query.scope();
        let plan = plan_page(
            query.base_filter(),
            ReviewQuery::SORT,
            query.cursor.as_ref(),
            query.page_size,
            &scope,
        );

        let rows = self
            .store
            .query_reviews(&plan.filter, &plan.order, plan.limit)
            .await?;

        Ok(assemble_page(rows, ReviewQuery::SORT, query.page_size, &scope))
    }

    /// A product with live review statistics, or `None` if it does not exist.
    pub async fn product_detail(&self, id: Uuid) -> Result<Option<ProductDetail>> {
        let Some(product) = self.store.find_product(id).await? else {
            return Ok(None);
        };

        let stats = self
            .store
            .aggregate_reviews(&Predicate::compare(
                Column::ReviewProductId,
                CompareOp::Eq,
                SqlValue::Uuid(id),
            ))
            .await?;

        Ok(Some(ProductDetail { product, stats }))
    }
}
