//! Loan (issue) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Loan lifecycle state. `Issued -> Returned` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum LoanStatus {
    Issued,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Issued => "Issued",
            LoanStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "issued" => Ok(LoanStatus::Issued),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Loan row as stored in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub book_id: i64,
    pub student_id: i64,
    pub issue_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

/// Loan joined with the book title and student name for display.
/// Title and name are absent when the referenced row has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub book_id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub issue_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

/// Loan listing filter
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    /// Only loans still out (status Issued)
    #[serde(default)]
    pub only_issued: bool,
    /// Case-insensitive match on book title or student name
    pub search: Option<String>,
}

/// Fields of a loan about to be issued
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub book_id: i64,
    pub student_id: i64,
    pub issue_date: NaiveDate,
    pub expected_return_date: NaiveDate,
}

/// An outstanding loan past its expected return date
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverdueLoan {
    #[serde(flatten)]
    pub loan: LoanDetails,
    pub overdue_days: i64,
}
