//! Book (catalog) endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBookRequest, UpdateBookRequest},
    query::QuerySpec,
};

/// Paginated book list response
#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    pub success: bool,
    /// Total number of matching books
    pub total: i64,
    /// Number of books in this page
    pub count: usize,
    /// Books projected to the selected fields
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Value>,
}

/// Single book response
#[derive(Serialize, ToSchema)]
pub struct BookResponse {
    pub success: bool,
    pub data: Book,
}

/// List books with filtering, keyword search, sorting, field selection
/// and pagination
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Books per page (default: 20, max: 100)"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort fields, '-' prefix for descending"),
        ("fields" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("keyword" = Option<String>, Query, description = "Case-insensitive search across title, author and genre"),
        ("genre" = Option<String>, Query, description = "Filter by genre"),
        ("author" = Option<String>, Query, description = "Filter by author")
    ),
    responses(
        (status = 200, description = "List of books", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<BookListResponse>> {
    let spec = QuerySpec::from_params(&params);
    let (books, total) = state.services.catalog.list_books(&spec).await?;

    let data = books
        .iter()
        .map(|book| serde_json::to_value(book).map(|row| spec.project(row)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(format!("Failed to serialize book: {}", e)))?;

    Ok(Json(BookListResponse {
        success: true,
        total,
        count: data.len(),
        data,
    }))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Title or author missing", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let created = state.services.catalog.create_book(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            success: true,
            data: created,
        }),
    ))
}

/// Get a single book by ID
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 400, description = "Malformed book ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.catalog.get_book(&id).await?;
    Ok(Json(BookResponse {
        success: true,
        data: book,
    }))
}

/// Update a book; availability is recomputed when copies change
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Malformed book ID or invalid payload", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(changes): Json<UpdateBookRequest>,
) -> AppResult<Json<BookResponse>> {
    let updated = state.services.catalog.update_book(&id, changes).await?;
    Ok(Json(BookResponse {
        success: true,
        data: updated,
    }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Malformed book ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
