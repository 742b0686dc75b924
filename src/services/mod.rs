//! Business logic services

pub mod background;
pub mod catalog;
pub mod export;
pub mod loans;
pub mod overdue;
pub mod reports;
pub mod students;
pub mod users;

use chrono::NaiveDate;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub students: students::StudentsService,
    pub loans: loans::LoansService,
    pub overdue: overdue::OverdueService,
    pub reports: reports::ReportsService,
    pub export: export::ExportService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            students: students::StudentsService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            overdue: overdue::OverdueService::new(repository.clone()),
            reports: reports::ReportsService::new(repository.clone()),
            export: export::ExportService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            repository,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }
}

/// Local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Trim an optional text field; blank becomes `None`
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
