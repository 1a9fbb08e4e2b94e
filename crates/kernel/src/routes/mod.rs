//! HTTP route handlers.

pub mod health;
pub mod products;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Every application route, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(reviews::router())
}
