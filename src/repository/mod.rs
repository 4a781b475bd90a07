//! Repository layer for database operations

pub mod books;
pub mod borrows;

use sqlx::{Pool, Postgres};

/// Main repository struct holding the per-collection repositories
#[derive(Clone)]
pub struct Repository {
    pub books: books::BooksRepository,
    pub borrows: borrows::BorrowsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool),
        }
    }
}
