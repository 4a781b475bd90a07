//! Borrows repository: the borrow transaction and the summary report

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{Borrow, BorrowRequest, BorrowSummary},
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow copies of a book inside a single transaction.
    ///
    /// The book row is locked with SELECT ... FOR UPDATE, so the
    /// sufficiency check and the decrement are atomic even across server
    /// instances. Every early return drops the transaction guard, which
    /// rolls back; the book update and the borrow insert become visible
    /// together or not at all.
    pub async fn create(&self, book_id: i32, request: &BorrowRequest) -> AppResult<Borrow> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, genre, isbn, description, copies, available,
                   image, revision, created_at, updated_at
            FROM books
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if request.quantity > book.copies {
            return Err(AppError::BusinessRule("Not enough copies".to_string()));
        }

        let remaining = book.copies - request.quantity;

        sqlx::query(
            r#"
            UPDATE books
            SET copies = $1, available = $2, revision = revision + 1, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(remaining)
        .bind(remaining > 0)
        .bind(now)
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (book_id, borrower_name, quantity, borrowed_at, due_date,
                                 returned, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $4, $4)
            RETURNING id, book_id, borrower_name, quantity, borrowed_at, due_date,
                      returned_at, returned, created_at, updated_at
            "#,
        )
        .bind(book_id)
        .bind(&request.borrower_name)
        .bind(request.quantity)
        .bind(now)
        .bind(request.due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Borrowed {} copies of book {} for {}",
            request.quantity,
            book_id,
            request.borrower_name
        );

        Ok(borrow)
    }

    /// Total borrowed quantity per book.
    ///
    /// Inner join: books with no borrow records do not appear.
    pub async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        let rows = sqlx::query_as::<_, BorrowSummary>(
            r#"
            SELECT b.id AS book_id, b.title, b.isbn,
                   SUM(br.quantity)::BIGINT AS total_quantity
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            GROUP BY b.id, b.title, b.isbn
            ORDER BY total_quantity DESC, b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
