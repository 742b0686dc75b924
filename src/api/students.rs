//! Student registry endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::student::{CreateStudent, Student, StudentQuery, UpdateStudent},
};

use super::AuthenticatedUser;

/// List students, ordered by name
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    security(("basic_auth" = [])),
    params(StudentQuery),
    responses(
        (status = 200, description = "List of students", body = Vec<Student>)
    )
)]
pub async fn list_students(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<StudentQuery>,
) -> AppResult<Json<Vec<Student>>> {
    let students = state.services.students.list_students(query.search.as_deref()).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Student>> {
    let student = state.services.students.get_student(id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    security(("basic_auth" = [])),
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student registered", body = Student),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_student(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Json(student): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    let created = state.services.students.add_student(student).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateStudent>,
) -> AppResult<Json<Student>> {
    let updated = state.services.students.update_student(id, changes).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student still holds a book")
    )
)]
pub async fn delete_student(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.students.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
