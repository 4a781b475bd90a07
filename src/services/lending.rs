//! Lending service: borrow transactions and the borrow summary report

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::borrow::{Borrow, BorrowPayload, BorrowRequest, BorrowSummary},
    repository::Repository,
};

use super::catalog::parse_book_id;

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow copies of a book, recording the loan atomically.
    ///
    /// The payload is validated in full before any transaction is opened.
    pub async fn borrow_book(&self, book_id: &str, payload: BorrowPayload) -> AppResult<Borrow> {
        let book_id = parse_book_id(book_id)?;
        let request = validate_borrow(payload)?;
        self.repository.borrows.create(book_id, &request).await
    }

    /// Per-book totals across all borrow records
    pub async fn borrow_summary(&self) -> AppResult<Vec<BorrowSummary>> {
        self.repository.borrows.summary().await
    }
}

fn validate_borrow(payload: BorrowPayload) -> AppResult<BorrowRequest> {
    let quantity = match payload.quantity {
        Some(quantity) if quantity > 0 && quantity <= i32::MAX as i64 => quantity as i32,
        _ => return Err(AppError::Validation("Invalid quantity".to_string())),
    };

    let due_date = match payload.due_date.as_deref() {
        Some(raw) => parse_due_date(raw)?,
        None => return Err(AppError::Validation("Due date is required".to_string())),
    };

    let borrower_name = match payload.borrower_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return Err(AppError::Validation(
                "Borrower name is required".to_string(),
            ))
        }
    };

    Ok(BorrowRequest {
        quantity,
        due_date,
        borrower_name,
    })
}

/// Accepts an RFC 3339 timestamp or a plain YYYY-MM-DD date
fn parse_due_date(raw: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DateTime::from_naive_utc_and_offset(
            date.and_time(NaiveTime::MIN),
            Utc,
        ));
    }
    Err(AppError::Validation("Invalid due date".to_string()))
}
