//! Read-only reports over the catalog and the loan ledger

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::report::{BookLoanCount, Dashboard, IssueReportRow},
    repository::{loans, Repository},
};

use super::overdue::{compute_overdue, days_overdue};

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Most borrowed books over the whole history, ties broken by title
    pub async fn top_books_by_loan_count(&self, limit: i64) -> AppResult<Vec<BookLoanCount>> {
        if limit < 0 {
            return Err(AppError::Validation("Limit cannot be negative".to_string()));
        }

        let rows = sqlx::query_as::<_, BookLoanCount>(
            r#"
            SELECT b.id AS book_id, b.title, b.author, COUNT(l.id) AS times_issued
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id
            GROUP BY b.id, b.title, b.author
            ORDER BY times_issued DESC, b.title ASC, b.id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows)
    }

    /// Full loan history with each row's overdue day count as of `as_of`
    pub async fn all_issues_report(&self, as_of: NaiveDate) -> AppResult<Vec<IssueReportRow>> {
        let history = self.repository.loans.list(false, None).await?;

        Ok(history
            .into_iter()
            .map(|loan| {
                let overdue_days = days_overdue(&loan, as_of).unwrap_or(0);
                IssueReportRow { loan, overdue_days }
            })
            .collect())
    }

    /// Catalog, registry and ledger summary read from one snapshot
    pub async fn dashboard(&self, as_of: NaiveDate) -> AppResult<Dashboard> {
        let mut tx = self.repository.pool.begin().await?;

        let (total_titles, available_copies): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(quantity), 0) FROM books")
                .fetch_one(&mut *tx)
                .await?;

        let total_students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&mut *tx)
            .await?;

        let issued = loans::list_details(&mut *tx, true, None).await?;

        tx.commit().await?;

        Ok(Dashboard {
            as_of,
            total_titles,
            available_copies,
            total_students,
            issued_loans: issued.len() as i64,
            overdue: compute_overdue(as_of, &issued),
        })
    }
}
