//! Borrow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrow::{Borrow, BorrowPayload, BorrowSummary},
};

/// Single borrow response
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub success: bool,
    pub data: Borrow,
}

/// Borrow summary response
#[derive(Serialize, ToSchema)]
pub struct BorrowSummaryResponse {
    pub success: bool,
    pub data: Vec<BorrowSummary>,
}

/// Borrow copies of a book
#[utoipa::path(
    post,
    path = "/api/borrows/{book_id}",
    tag = "borrows",
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    request_body = BorrowPayload,
    responses(
        (status = 201, description = "Borrow recorded", body = BorrowResponse),
        (status = 400, description = "Invalid request or not enough copies", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Path(book_id): Path<String>,
    Json(payload): Json<BorrowPayload>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let borrow = state.services.lending.borrow_book(&book_id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            success: true,
            data: borrow,
        }),
    ))
}

/// Per-book totals of borrowed quantities
#[utoipa::path(
    get,
    path = "/api/borrows/summary",
    tag = "borrows",
    responses(
        (status = 200, description = "Borrow totals per book", body = BorrowSummaryResponse)
    )
)]
pub async fn borrow_summary(
    State(state): State<crate::AppState>,
) -> AppResult<Json<BorrowSummaryResponse>> {
    let data = state.services.lending.borrow_summary().await?;
    Ok(Json(BorrowSummaryResponse {
        success: true,
        data,
    }))
}
