//! Librarium Library Lending API
//!
//! A Rust REST JSON API for managing a book catalog and its borrowing
//! workflow: CRUD over books, transactional borrowing, and per-book
//! borrow reporting.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
