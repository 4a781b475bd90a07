//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBookRequest, NewBook, UpdateBookRequest},
    query::QuerySpec,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books matching the composed query
    pub async fn list_books(&self, spec: &QuerySpec) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(spec).await
    }

    /// Get a book by its path identifier
    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        let id = parse_book_id(id)?;
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, payload: CreateBookRequest) -> AppResult<Book> {
        let book = validate_create(payload)?;
        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: &str, changes: UpdateBookRequest) -> AppResult<Book> {
        let id = parse_book_id(id)?;
        validate_update(&changes)?;
        self.repository.books.update(id, &changes).await
    }

    /// Delete a book
    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        let id = parse_book_id(id)?;
        self.repository.books.delete(id).await
    }
}

/// Parse a path identifier into a book id
pub(crate) fn parse_book_id(raw: &str) -> AppResult<i32> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid book ID".to_string()))
}

fn validate_create(payload: CreateBookRequest) -> AppResult<NewBook> {
    let title = payload.title.unwrap_or_default();
    let author = payload.author.unwrap_or_default();
    if title.trim().is_empty() || author.trim().is_empty() {
        return Err(AppError::Validation(
            "Title and author are required".to_string(),
        ));
    }

    let copies = payload.copies.unwrap_or(1);
    if copies < 0 {
        return Err(AppError::Validation(
            "Copies cannot be negative".to_string(),
        ));
    }

    Ok(NewBook {
        title,
        author,
        genre: payload.genre,
        isbn: payload.isbn,
        description: payload.description,
        copies,
        image: payload.image,
    })
}

fn validate_update(changes: &UpdateBookRequest) -> AppResult<()> {
    if matches!(changes.title.as_deref(), Some(title) if title.trim().is_empty()) {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    if matches!(changes.author.as_deref(), Some(author) if author.trim().is_empty()) {
        return Err(AppError::Validation("Author cannot be empty".to_string()));
    }
    if matches!(changes.copies, Some(copies) if copies < 0) {
        return Err(AppError::Validation(
            "Copies cannot be negative".to_string(),
        ));
    }
    Ok(())
}
