//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, NewBook, UpdateBookRequest},
    query::{BindValue, QuerySpec},
};

const BOOK_COLUMNS: &str = "id, title, author, genre, isbn, description, copies, available, \
                            image, revision, created_at, updated_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let sql = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Execute a composed query: one filtered count, one filtered page
    pub async fn search(&self, spec: &QuerySpec) -> AppResult<(Vec<Book>, i64)> {
        let compiled = spec.compile();

        let count_sql = format!("SELECT COUNT(*) FROM books WHERE {}", compiled.where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &compiled.binds {
            count_query = match value {
                BindValue::Int(v) => count_query.bind(*v),
                BindValue::Bool(v) => count_query.bind(*v),
                BindValue::Text(v) => count_query.bind(v.clone()),
                BindValue::Timestamp(v) => count_query.bind(*v),
            };
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            "SELECT {} FROM books WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
            BOOK_COLUMNS,
            compiled.where_clause,
            compiled.order_clause,
            compiled.limit,
            compiled.offset
        );
        let mut select_query = sqlx::query_as::<_, Book>(&select_sql);
        for value in &compiled.binds {
            select_query = match value {
                BindValue::Int(v) => select_query.bind(*v),
                BindValue::Bool(v) => select_query.bind(*v),
                BindValue::Text(v) => select_query.bind(v.clone()),
                BindValue::Timestamp(v) => select_query.bind(*v),
            };
        }
        let books = select_query.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a new book; availability is derived from copies
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, genre, isbn, description, copies, available,
                               image, revision, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6 > 0, $7, 0, $8, $8)
            RETURNING id, title, author, genre, isbn, description, copies, available,
                      image, revision, created_at, updated_at
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.copies)
        .bind(&book.image)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an existing book. Absent fields keep their stored value;
    /// availability is recomputed from the resulting copies and the
    /// revision counter is bumped.
    pub async fn update(&self, id: i32, changes: &UpdateBookRequest) -> AppResult<Book> {
        let now = Utc::now();

        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($1, title),
                author = COALESCE($2, author),
                genre = COALESCE($3, genre),
                isbn = COALESCE($4, isbn),
                description = COALESCE($5, description),
                copies = COALESCE($6, copies),
                image = COALESCE($7, image),
                available = COALESCE($6, copies) > 0,
                revision = revision + 1,
                updated_at = $8
            WHERE id = $9
            RETURNING id, title, author, genre, isbn, description, copies, available,
                      image, revision, created_at, updated_at
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.author)
        .bind(&changes.genre)
        .bind(&changes.isbn)
        .bind(&changes.description)
        .bind(changes.copies)
        .bind(&changes.image)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book; its borrow records cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
