//! Borrow (loan) model and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Borrow record from database.
///
/// Borrows are created by the borrow transaction and never updated or
/// deleted here; returned_at/returned exist for the return workflow of the
/// wider system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: i32,
    pub book_id: i32,
    pub borrower_name: String,
    pub quantity: i32,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub returned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Borrow request body as received; validated into `BorrowRequest`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowPayload {
    pub quantity: Option<i64>,
    /// RFC 3339 timestamp or plain YYYY-MM-DD date
    #[serde(alias = "dueAt")]
    pub due_date: Option<String>,
    pub borrower_name: Option<String>,
}

/// Validated borrow request
#[derive(Debug, Clone, PartialEq)]
pub struct BorrowRequest {
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub borrower_name: String,
}

/// Per-book totals across all borrow records
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummary {
    pub book_id: i32,
    pub title: String,
    pub isbn: Option<String>,
    pub total_quantity: i64,
}
