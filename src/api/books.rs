//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{AssignBarcode, Book, BookQuery, CreateBook, UpdateBook},
};

use super::AuthenticatedUser;

/// List books, ordered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("basic_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books(query.search.as_deref()).await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Find a book by scanned barcode
#[utoipa::path(
    get,
    path = "/books/barcode/{barcode}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("barcode" = String, Path, description = "Book barcode")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "No book carries this barcode")
    )
)]
pub async fn get_book_by_barcode(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(barcode): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.find_book_by_barcode(&barcode).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("basic_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Barcode already assigned")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.catalog.add_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Barcode already assigned")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.catalog.update_book(id, changes).await?;
    Ok(Json(updated))
}

/// Assign or replace a book's barcode
#[utoipa::path(
    put,
    path = "/books/{id}/barcode",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = AssignBarcode,
    responses(
        (status = 200, description = "Barcode assigned", body = Book),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Barcode already assigned to another book")
    )
)]
pub async fn assign_barcode(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<AssignBarcode>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.assign_barcode(id, &request.barcode).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book currently issued")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
