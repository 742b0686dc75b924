//! CSV export endpoint

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::{error::AppResult, services::export::ExportTable};

use super::AuthenticatedUser;

/// Download one table as CSV
#[utoipa::path(
    get,
    path = "/export/{table}",
    tag = "export",
    security(("basic_auth" = [])),
    params(
        ("table" = String, Path, description = "One of books, students, loans, users")
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 404, description = "Unknown table or table is empty")
    )
)]
pub async fn export_table(
    State(state): State<crate::AppState>,
    AuthenticatedUser(username): AuthenticatedUser,
    Path(table): Path<String>,
) -> AppResult<impl IntoResponse> {
    let table: ExportTable = table.parse()?;

    let mut buffer = Vec::new();
    let rows = state.services.export.export_table(table, &mut buffer).await?;

    tracing::info!("User '{}' exported {} rows from {}", username, rows, table);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}_export.csv\"", table),
            ),
        ],
        buffer,
    ))
}
