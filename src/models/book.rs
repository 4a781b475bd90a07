//! Book (catalog) model and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    /// Remaining lendable stock
    pub copies: i32,
    /// Derived from copies on every persist
    pub available: bool,
    pub image: Option<String>,
    /// Internal version counter, bumped on every update
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    /// Defaults to 1
    pub copies: Option<i32>,
    pub image: Option<String>,
}

/// Validated create payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub copies: i32,
    pub image: Option<String>,
}

/// Update book request. Only the listed fields may change; unknown fields
/// are rejected at the boundary. Availability is recomputed from copies.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub copies: Option<i32>,
    pub image: Option<String>,
}
