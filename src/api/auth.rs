//! Staff login endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::LoginRequest,
};

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub username: String,
    pub authenticated: bool,
}

/// Check a username/password pair
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let valid = state
        .services
        .users
        .validate_user(&request.username, &request.password)
        .await?;

    if !valid {
        return Err(AppError::Authentication("Invalid username or password".to_string()));
    }

    tracing::info!("User '{}' logged in", request.username);

    Ok(Json(LoginResponse {
        username: request.username,
        authenticated: true,
    }))
}
