//! Loan ledger service: issue and return

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, NewLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Issue one copy of a book to a student.
    ///
    /// The expected return date may not precede the issue date. The copy count
    /// and the new loan are written in one transaction.
    pub async fn issue_book(
        &self,
        book_id: i64,
        student_id: i64,
        issue_date: NaiveDate,
        expected_return_date: NaiveDate,
    ) -> AppResult<i64> {
        if expected_return_date < issue_date {
            return Err(AppError::InvalidDateRange {
                issue_date,
                expected_return_date,
            });
        }

        let loan = NewLoan {
            book_id,
            student_id,
            issue_date,
            expected_return_date,
        };

        match self.repository.loans.issue(&loan).await {
            Ok(loan_id) => {
                tracing::info!(
                    "Issued book {} to student {} as loan {} (due {})",
                    book_id,
                    student_id,
                    loan_id,
                    expected_return_date
                );
                Ok(loan_id)
            }
            Err(e @ AppError::InsufficientCopies { .. }) => {
                tracing::warn!("Issue refused: {}", e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Issue the book carrying `barcode`
    pub async fn issue_book_by_barcode(
        &self,
        barcode: &str,
        student_id: i64,
        issue_date: NaiveDate,
        expected_return_date: NaiveDate,
    ) -> AppResult<i64> {
        let book = self
            .repository
            .books
            .get_by_barcode(barcode.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book with barcode {}", barcode.trim())))?;

        self.issue_book(book.id, student_id, issue_date, expected_return_date)
            .await
    }

    /// Close a loan. Any return date is accepted, including one before the issue date.
    pub async fn return_book(&self, loan_id: i64, actual_return_date: NaiveDate) -> AppResult<Loan> {
        match self.repository.loans.return_loan(loan_id, actual_return_date).await {
            Ok(loan) => {
                tracing::info!(
                    "Loan {} returned on {} (book {})",
                    loan_id,
                    actual_return_date,
                    loan.book_id
                );
                Ok(loan)
            }
            Err(e @ AppError::AlreadyReturned { .. }) => {
                tracing::warn!("Return refused: {}", e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Return the book carrying `barcode`. The book must have exactly one copy out.
    pub async fn return_book_by_barcode(
        &self,
        barcode: &str,
        actual_return_date: NaiveDate,
    ) -> AppResult<Loan> {
        let barcode = barcode.trim();
        let book = self
            .repository
            .books
            .get_by_barcode(barcode)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book with barcode {}", barcode)))?;

        let outstanding = self.repository.loans.issued_for_book(book.id).await?;
        match outstanding.as_slice() {
            [] => Err(AppError::NotFound(format!(
                "Book '{}' is not currently issued",
                book.title
            ))),
            [loan] => self.return_book(loan.id, actual_return_date).await,
            many => {
                let ids: Vec<String> = many.iter().map(|l| l.id.to_string()).collect();
                Err(AppError::Conflict(format!(
                    "Book '{}' has {} copies issued (loans {}); return by loan id",
                    book.title,
                    many.len(),
                    ids.join(", ")
                )))
            }
        }
    }

    /// Get one loan with book and student names
    pub async fn get_loan(&self, id: i64) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(id).await
    }

    /// List loans, most recent issue first
    pub async fn list_loans(&self, only_issued: bool, search: Option<&str>) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list(only_issued, search).await
    }

    /// Full loan history
    pub async fn list_all_loans(&self, search: Option<&str>) -> AppResult<Vec<LoanDetails>> {
        self.list_loans(false, search).await
    }
}
