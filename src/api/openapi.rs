//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, export, health, loans, reports, students};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "School library catalog, student registry and loan ledger"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        // Books
        books::list_books,
        books::get_book,
        books::get_book_by_barcode,
        books::create_book,
        books::update_book,
        books::assign_barcode,
        books::delete_book,
        // Students
        students::list_students,
        students::get_student,
        students::create_student,
        students::update_student,
        students::delete_student,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::issue_loan,
        loans::return_loan,
        loans::return_loan_by_barcode,
        // Reports
        reports::overdue,
        reports::top_books,
        reports::all_issues,
        reports::dashboard,
        // Export
        export::export_table,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::LoginRequest,
            auth::LoginResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::AssignBarcode,
            // Students
            crate::models::student::Student,
            crate::models::student::CreateStudent,
            crate::models::student::UpdateStudent,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanDetails,
            crate::models::loan::OverdueLoan,
            loans::IssueLoanRequest,
            loans::LoanResponse,
            loans::ReturnLoanRequest,
            loans::ReturnResponse,
            // Reports
            crate::models::report::BookLoanCount,
            crate::models::report::IssueReportRow,
            crate::models::report::Dashboard,
            // Export
            crate::services::export::ExportTable,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Staff authentication"),
        (name = "books", description = "Book catalog"),
        (name = "students", description = "Student registry"),
        (name = "loans", description = "Issue and return"),
        (name = "reports", description = "Overdue, history and usage reports"),
        (name = "export", description = "CSV export")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
