//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::db;
use crate::format::PriceFormatter;
use crate::listing::FilterNormalizer;
use crate::services::{CatalogService, ReviewService};
use crate::store::{CatalogStore, MemoryStore, PgStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Storage engine behind every service.
    store: Arc<dyn CatalogStore>,

    /// Listing reads.
    catalog: CatalogService,

    /// Review writes.
    reviews: ReviewService,

    /// Query parameter normalization for both listings.
    normalizer: FilterNormalizer,

    /// Price display formatting.
    prices: PriceFormatter,
}

impl AppState {
    /// Connect the configured storage engine and build the services.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn CatalogStore> = match &config.store {
            StoreBackend::Postgres { database_url } => {
                let pool = db::create_pool(database_url, config.database_max_connections)
                    .await
                    .context("failed to create database pool")?;

                db::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;

                info!("PostgreSQL store ready");
                Arc::new(PgStore::new(pool))
            }
            StoreBackend::Memory => {
                info!("in-memory store ready; data will not persist");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(store, config))
    }

    /// Build state around an existing store.
    pub fn with_store(store: Arc<dyn CatalogStore>, config: &Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(store.clone()),
                reviews: ReviewService::new(store.clone()),
                normalizer: FilterNormalizer::new(config.listing_validation),
                prices: PriceFormatter::new(config.currency_symbol.clone()),
                store,
            }),
        }
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    pub fn reviews(&self) -> &ReviewService {
        &self.inner.reviews
    }

    pub fn normalizer(&self) -> FilterNormalizer {
        self.inner.normalizer
    }

    pub fn prices(&self) -> &PriceFormatter {
        &self.inner.prices
    }

    /// Check if the storage engine is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.healthy().await
    }
}
