//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bookbank_http::error::AppError;

use super::models::{AddBook, Book, LendingResponse, NewCopies, RequestBook};
use super::tracker::AvailabilityTracker;

type SharedTracker = Arc<AvailabilityTracker>;

pub fn router(tracker: SharedTracker) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(list_books))
        .route("/catalog/{title}", get(get_book))
        .route("/request", post(request_book))
        .route("/add", post(add_book))
        .with_state(tracker)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(tracker): State<SharedTracker>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(tracker.catalog().await?))
}

async fn get_book(
    State(tracker): State<SharedTracker>,
    Path(title): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(tracker.find(&title).await?))
}

async fn request_book(
    State(tracker): State<SharedTracker>,
    payload: Result<Json<RequestBook>, JsonRejection>,
) -> Result<Json<LendingResponse>, AppError> {
    let Json(payload) = payload.map_err(malformed_body)?;
    let title = payload.title()?;

    let outcome = tracker.request_book(&title).await?;
    Ok(Json(LendingResponse {
        message: outcome.message,
        book: outcome.book,
    }))
}

async fn add_book(
    State(tracker): State<SharedTracker>,
    payload: Result<Json<AddBook>, JsonRejection>,
) -> Result<(StatusCode, Json<LendingResponse>), AppError> {
    let Json(payload) = payload.map_err(malformed_body)?;
    let input = NewCopies::try_from(payload)?;

    let outcome = tracker.add_copies(input).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(LendingResponse {
            message: outcome.message,
            book: Some(outcome.book),
        }),
    ))
}

fn malformed_body(rejection: JsonRejection) -> AppError {
    AppError::validation(
        vec![serde_json::json!({ "field": "body", "error": rejection.body_text() })],
        "Request body must be a JSON object",
    )
}
