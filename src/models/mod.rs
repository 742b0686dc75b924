//! Data models for Libris

pub mod book;
pub mod loan;
pub mod report;
pub mod student;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanDetails, LoanStatus, OverdueLoan};
pub use student::Student;
pub use user::User;

use validator::ValidationError;

/// Reject empty or whitespace-only strings
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
