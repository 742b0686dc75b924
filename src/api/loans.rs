//! Loan ledger endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails, LoanQuery},
    services,
};

use super::AuthenticatedUser;

/// Issue request. The book is given either by id or by barcode.
#[derive(Deserialize, ToSchema)]
pub struct IssueLoanRequest {
    /// Book ID
    pub book_id: Option<i64>,
    /// Book barcode (used when `book_id` is absent)
    pub barcode: Option<String>,
    /// Student ID
    pub student_id: i64,
    /// Defaults to today
    pub issue_date: Option<NaiveDate>,
    /// Defaults to the issue date plus the configured loan duration
    pub expected_return_date: Option<NaiveDate>,
}

/// Issued loan
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    /// Loan ID
    pub id: i64,
    pub issue_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    /// Status message
    pub message: String,
}

/// Return request
#[derive(Deserialize, ToSchema, Default)]
pub struct ReturnLoanRequest {
    /// Defaults to today
    pub actual_return_date: Option<NaiveDate>,
}

/// Return response with the closed loan
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    pub loan: Loan,
}

/// List loans, most recent issue first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("basic_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state
        .services
        .loans
        .list_loans(query.only_issued, query.search.as_deref())
        .await?;
    Ok(Json(loans))
}

#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan(id).await?;
    Ok(Json(loan))
}

/// Issue a book to a student
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("basic_auth" = [])),
    request_body = IssueLoanRequest,
    responses(
        (status = 201, description = "Book issued", body = LoanResponse),
        (status = 400, description = "Expected return date before issue date"),
        (status = 404, description = "Book or student not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn issue_loan(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Json(request): Json<IssueLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let issue_date = request.issue_date.unwrap_or_else(services::today);
    let expected_return_date = match request.expected_return_date {
        Some(date) => date,
        None => issue_date
            .checked_add_signed(Duration::days(state.config.loans.default_duration_days))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "No default return date after {}; send expected_return_date",
                    issue_date
                ))
            })?,
    };

    let id = match (request.book_id, request.barcode.as_deref()) {
        (Some(book_id), _) => {
            state
                .services
                .loans
                .issue_book(book_id, request.student_id, issue_date, expected_return_date)
                .await?
        }
        (None, Some(barcode)) => {
            state
                .services
                .loans
                .issue_book_by_barcode(barcode, request.student_id, issue_date, expected_return_date)
                .await?
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Either book_id or barcode is required".to_string(),
            ))
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            id,
            issue_date,
            expected_return_date,
            message: "Book issued".to_string(),
        }),
    ))
}

/// Return a loan by ID
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body(content = ReturnLoanRequest, description = "Optional return date"),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Malformed return request"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    body: Bytes,
) -> AppResult<Json<ReturnResponse>> {
    let return_date = return_date(&body)?;
    let loan = state.services.loans.return_book(id, return_date).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan,
    }))
}

/// Return the only outstanding loan of the book carrying `barcode`
#[utoipa::path(
    post,
    path = "/loans/barcode/{barcode}/return",
    tag = "loans",
    security(("basic_auth" = [])),
    params(
        ("barcode" = String, Path, description = "Book barcode")
    ),
    request_body(content = ReturnLoanRequest, description = "Optional return date"),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Malformed return request"),
        (status = 404, description = "Unknown barcode or book not issued"),
        (status = 409, description = "Several copies out; return by loan ID")
    )
)]
pub async fn return_loan_by_barcode(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(barcode): Path<String>,
    body: Bytes,
) -> AppResult<Json<ReturnResponse>> {
    let return_date = return_date(&body)?;
    let loan = state
        .services
        .loans
        .return_book_by_barcode(&barcode, return_date)
        .await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan,
    }))
}

/// Return date from an optional JSON body. Only an empty body means today;
/// a body that does not parse is rejected.
fn return_date(body: &[u8]) -> AppResult<NaiveDate> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(services::today());
    }

    let request: ReturnLoanRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid return request: {}", e)))?;

    Ok(request.actual_return_date.unwrap_or_else(services::today))
}
