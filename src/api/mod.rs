//! API handlers for Libris REST endpoints

pub mod auth;
pub mod books;
pub mod export;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod reports;
pub mod students;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Extractor for a staff member authenticated with HTTP Basic credentials
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let encoded = auth_header
            .strip_prefix("Basic ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let decoded = STANDARD
            .decode(encoded.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| AppError::Authentication("Malformed credentials".to_string()))?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| AppError::Authentication("Malformed credentials".to_string()))?;

        if !state.services.users.validate_user(username, password).await? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        Ok(AuthenticatedUser(username.to_string()))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        // Books (catalog)
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/barcode", put(books::assign_barcode))
        .route("/books/barcode/:barcode", get(books::get_book_by_barcode))
        // Students
        .route("/students", get(students::list_students).post(students::create_student))
        .route(
            "/students/:id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::issue_loan))
        .route("/loans/:id", get(loans::get_loan))
        .route("/loans/:id/return", post(loans::return_loan))
        .route("/loans/barcode/:barcode/return", post(loans::return_loan_by_barcode))
        // Reports
        .route("/reports/overdue", get(reports::overdue))
        .route("/reports/top-books", get(reports::top_books))
        .route("/reports/issues", get(reports::all_issues))
        .route("/reports/dashboard", get(reports::dashboard))
        // Export
        .route("/export/:table", get(export::export_table))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
