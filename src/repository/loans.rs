//! Loans repository: the issue/return ledger

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite, SqliteExecutor};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanStatus, NewLoan},
};

use super::{begin_write, like_pattern, search_term};

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.book_id, b.title, b.author, l.student_id, s.name AS student_name,
           l.issue_date, l.expected_return_date, l.actual_return_date, l.status
    FROM loans l
    LEFT JOIN books b ON l.book_id = b.id
    LEFT JOIN students s ON l.student_id = s.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Sqlite>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        fetch_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan by ID joined with book and student
    pub async fn get_details(&self, id: i64) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE l.id = ?", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List loans, most recently issued first
    pub async fn list(&self, only_issued: bool, search: Option<&str>) -> AppResult<Vec<LoanDetails>> {
        list_details(&self.pool, only_issued, search).await
    }

    /// Loans of a book that are still out
    pub async fn issued_for_book(&self, book_id: i64) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE l.book_id = ? AND l.status = ? ORDER BY l.issue_date DESC, l.id DESC",
            DETAILS_SELECT
        ))
        .bind(book_id)
        .bind(LoanStatus::Issued)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Issue a copy: decrement the book's quantity and record the loan in one transaction
    pub async fn issue(&self, loan: &NewLoan) -> AppResult<i64> {
        let mut tx = begin_write(&self.pool).await?;

        let quantity: i64 = sqlx::query_scalar("SELECT quantity FROM books WHERE id = ?")
            .bind(loan.book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", loan.book_id)))?;

        let student_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE id = ?")
            .bind(loan.student_id)
            .fetch_one(&mut *tx)
            .await?;

        if student_count == 0 {
            return Err(AppError::NotFound(format!(
                "Student with id {} not found",
                loan.student_id
            )));
        }

        if quantity <= 0 {
            return Err(AppError::InsufficientCopies { book_id: loan.book_id });
        }

        let decremented = sqlx::query("UPDATE books SET quantity = quantity - 1 WHERE id = ? AND quantity > 0")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if decremented != 1 {
            return Err(AppError::InsufficientCopies { book_id: loan.book_id });
        }

        let loan_id = sqlx::query(
            r#"
            INSERT INTO loans (book_id, student_id, issue_date, expected_return_date, actual_return_date, status)
            VALUES (?, ?, ?, ?, NULL, ?)
            "#,
        )
        .bind(loan.book_id)
        .bind(loan.student_id)
        .bind(loan.issue_date)
        .bind(loan.expected_return_date)
        .bind(LoanStatus::Issued)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(loan_id)
    }

    /// Close a loan: mark it returned and put the copy back on the shelf in one transaction
    pub async fn return_loan(&self, loan_id: i64, actual_return_date: NaiveDate) -> AppResult<Loan> {
        let mut tx = begin_write(&self.pool).await?;

        let mut loan = fetch_by_id(&mut *tx, loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.status != LoanStatus::Issued {
            return Err(AppError::AlreadyReturned { loan_id });
        }

        let closed = sqlx::query(
            "UPDATE loans SET actual_return_date = ?, status = ? WHERE id = ? AND status = ?",
        )
        .bind(actual_return_date)
        .bind(LoanStatus::Returned)
        .bind(loan_id)
        .bind(LoanStatus::Issued)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if closed != 1 {
            return Err(AppError::AlreadyReturned { loan_id });
        }

        let restocked = sqlx::query("UPDATE books SET quantity = quantity + 1 WHERE id = ?")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if restocked == 0 {
            tracing::warn!(
                "Loan {} returned but book {} no longer exists; quantity not restored",
                loan_id,
                loan.book_id
            );
        }

        tx.commit().await?;

        loan.actual_return_date = Some(actual_return_date);
        loan.status = LoanStatus::Returned;
        Ok(loan)
    }
}

pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: i64) -> AppResult<Option<Loan>>
where
    E: SqliteExecutor<'e>,
{
    let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(loan)
}

/// All loans in id order
pub(crate) async fn fetch_all<'e, E>(executor: E) -> AppResult<Vec<Loan>>
where
    E: SqliteExecutor<'e>,
{
    let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY id")
        .fetch_all(executor)
        .await?;
    Ok(loans)
}

/// Joined loan listing ordered by issue date descending
pub(crate) async fn list_details<'e, E>(
    executor: E,
    only_issued: bool,
    search: Option<&str>,
) -> AppResult<Vec<LoanDetails>>
where
    E: SqliteExecutor<'e>,
{
    let mut conditions = Vec::new();
    if only_issued {
        conditions.push("l.status = 'Issued'");
    }

    let pattern = search_term(search).map(like_pattern);
    if pattern.is_some() {
        conditions.push(
            "(LOWER(COALESCE(b.title, '')) LIKE ?1 ESCAPE '\\' OR LOWER(COALESCE(s.name, '')) LIKE ?1 ESCAPE '\\')",
        );
    }

    let mut sql = DETAILS_SELECT.to_string();
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY l.issue_date DESC, l.id DESC");

    let mut query = sqlx::query_as::<_, LoanDetails>(&sql);
    if let Some(pattern) = pattern {
        query = query.bind(pattern);
    }

    let loans = query.fetch_all(executor).await?;
    Ok(loans)
}

pub(crate) async fn count_issued_for_book<'e, E>(executor: E, book_id: i64) -> AppResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = ? AND status = 'Issued'")
            .bind(book_id)
            .fetch_one(executor)
            .await?;
    Ok(count)
}

pub(crate) async fn count_issued_for_student<'e, E>(executor: E, student_id: i64) -> AppResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE student_id = ? AND status = 'Issued'")
            .bind(student_id)
            .fetch_one(executor)
            .await?;
    Ok(count)
}
