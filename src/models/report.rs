//! Read-only report rows

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::loan::{LoanDetails, OverdueLoan};

/// Historical loan count for one catalogued book
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct BookLoanCount {
    pub book_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub times_issued: i64,
}

/// Loan history row annotated with its overdue day count (0 when returned or on time)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IssueReportRow {
    #[serde(flatten)]
    pub loan: LoanDetails,
    pub overdue_days: i64,
}

/// Library summary at a reference date
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    /// Distinct titles in the catalog
    pub total_titles: i64,
    /// Copies on the shelf across all titles
    pub available_copies: i64,
    pub total_students: i64,
    pub issued_loans: i64,
    pub overdue: Vec<OverdueLoan>,
}
