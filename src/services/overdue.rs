//! Overdue evaluation
//!
//! [`compute_overdue`] is a pure function of a reference date and a loan set.
//! [`OverdueService`] feeds it the current issued loans on every call; nothing
//! is cached between calls.

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::loan::{LoanDetails, LoanStatus, OverdueLoan},
    repository::Repository,
};

use super::today;

/// Whole days `loan` is past its expected return date as of `as_of`.
///
/// `None` for returned loans and for loans due on or after `as_of`.
pub fn days_overdue(loan: &LoanDetails, as_of: NaiveDate) -> Option<i64> {
    if loan.status != LoanStatus::Issued {
        return None;
    }
    let days = (as_of - loan.expected_return_date).num_days();
    (days > 0).then_some(days)
}

/// Issued loans overdue as of `as_of`, in input order
pub fn compute_overdue(as_of: NaiveDate, loans: &[LoanDetails]) -> Vec<OverdueLoan> {
    loans
        .iter()
        .filter_map(|loan| {
            days_overdue(loan, as_of).map(|overdue_days| OverdueLoan {
                loan: loan.clone(),
                overdue_days,
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct OverdueService {
    repository: Repository,
}

impl OverdueService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Overdue loans as of `as_of`, most recently issued first
    pub async fn overdue_as_of(&self, as_of: NaiveDate) -> AppResult<Vec<OverdueLoan>> {
        let issued = self.repository.loans.list(true, None).await?;
        Ok(compute_overdue(as_of, &issued))
    }

    /// Overdue loans as of the local calendar date
    pub async fn overdue_today(&self) -> AppResult<Vec<OverdueLoan>> {
        self.overdue_as_of(today()).await
    }
}
