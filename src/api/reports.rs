//! Report endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        loan::OverdueLoan,
        report::{BookLoanCount, Dashboard, IssueReportRow},
    },
    services,
};

use super::AuthenticatedUser;

/// Reference date for overdue computations
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AsOfQuery {
    /// Defaults to today
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TopBooksQuery {
    /// Maximum number of books returned
    pub limit: Option<i64>,
}

/// Outstanding loans past their expected return date
#[utoipa::path(
    get,
    path = "/reports/overdue",
    tag = "reports",
    security(("basic_auth" = [])),
    params(AsOfQuery),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<OverdueLoan>)
    )
)]
pub async fn overdue(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<Vec<OverdueLoan>>> {
    let as_of = query.as_of.unwrap_or_else(services::today);
    let loans = state.services.overdue.overdue_as_of(as_of).await?;
    Ok(Json(loans))
}

/// Most borrowed books
#[utoipa::path(
    get,
    path = "/reports/top-books",
    tag = "reports",
    security(("basic_auth" = [])),
    params(TopBooksQuery),
    responses(
        (status = 200, description = "Books by loan count", body = Vec<BookLoanCount>),
        (status = 400, description = "Negative limit")
    )
)]
pub async fn top_books(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<TopBooksQuery>,
) -> AppResult<Json<Vec<BookLoanCount>>> {
    let limit = query.limit.unwrap_or(state.config.reports.top_books_limit);
    let books = state.services.reports.top_books_by_loan_count(limit).await?;
    Ok(Json(books))
}

/// Full loan history with overdue day counts
#[utoipa::path(
    get,
    path = "/reports/issues",
    tag = "reports",
    security(("basic_auth" = [])),
    params(AsOfQuery),
    responses(
        (status = 200, description = "All issues", body = Vec<IssueReportRow>)
    )
)]
pub async fn all_issues(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<Vec<IssueReportRow>>> {
    let as_of = query.as_of.unwrap_or_else(services::today);
    let rows = state.services.reports.all_issues_report(as_of).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/reports/dashboard",
    tag = "reports",
    security(("basic_auth" = [])),
    params(AsOfQuery),
    responses(
        (status = 200, description = "Library summary", body = Dashboard)
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<Dashboard>> {
    let as_of = query.as_of.unwrap_or_else(services::today);
    let dashboard = state.services.reports.dashboard(as_of).await?;
    Ok(Json(dashboard))
}
