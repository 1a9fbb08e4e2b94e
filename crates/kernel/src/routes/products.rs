//! Catalogue routes.
//!
//! Provides the keyset-paginated product listing and the product detail view.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::listing::Page;
use crate::models::{ProductView, ReviewStats};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub product: ProductView,
    pub stats: ReviewStats,
}

/// GET /api/products
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<ProductView>>> {
    let spec = state
        .normalizer()
        .listing(&params)
        .map_err(AppError::Validation)?;

    let page = state.catalog().list_products(&spec).await?;

    tracing::debug!(
        sort = ?spec.sort.key,
        direction = spec.sort.direction.as_str(),
        page_size = spec.page_size,
        items = page.items.len(),
        has_next = page.has_next(),
        "product page served"
    );

    let prices = state.prices();
    Ok(Json(page.map(|p| ProductView::new(p, prices))))
}

/// GET /api/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductDetailResponse>> {
    let id = Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound("product"))?;

    let detail = state
        .catalog()
        .product_detail(id)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    Ok(Json(ProductDetailResponse {
        product: ProductView::new(detail.product, state.prices()),
        stats: detail.stats,
    }))
}

/// Create the catalogue router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
}
