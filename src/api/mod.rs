//! API handlers for Librarium REST endpoints

pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;

use axum::{http::StatusCode, Json};

use crate::error::ErrorResponse;

/// Fallback handler for unmatched routes
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            message: "Route not found".to_string(),
        }),
    )
}
