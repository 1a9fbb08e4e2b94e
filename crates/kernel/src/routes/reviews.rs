//! Review routes.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::listing::Page;
use crate::models::Review;
use crate::services::ReviewSubmission;
use crate::state::AppState;
use crate::validation::ValidationError;

#[derive(Debug, Serialize)]
pub struct CreateReviewResponse {
    pub review: Review,
}

/// GET /api/reviews
async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Page<Review>>> {
    let query = state
        .normalizer()
        .reviews(&params)
        .map_err(AppError::Validation)?;

    let page = state.catalog().list_reviews(&query).await?;
    Ok(Json(page))
}

/// POST /api/reviews
async fn create_review(
    State(state): State<AppState>,
    body: Result<Json<ReviewSubmission>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreateReviewResponse>)> {
    let Json(submission) = body.map_err(|rejection| {
        AppError::Validation(vec![ValidationError::request(rejection.body_text())])
    })?;

    let review = state.reviews().submit(submission).await?;
    Ok((StatusCode::CREATED, Json(CreateReviewResponse { review })))
}

/// Create the review router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/reviews", get(list_reviews).post(create_review))
}
