//! Books repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite, SqliteExecutor};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::{begin_write, like_pattern, loans, search_term};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        fetch_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by barcode
    pub async fn get_by_barcode(&self, barcode: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE barcode = ?")
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    /// List books ordered by title, optionally filtered on title/author/category
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Book>> {
        let books = match search_term(search) {
            Some(term) => {
                let pattern = like_pattern(term);
                sqlx::query_as::<_, Book>(
                    r#"
                    SELECT * FROM books
                    WHERE LOWER(title) LIKE ?1 ESCAPE '\'
                       OR LOWER(COALESCE(author, '')) LIKE ?1 ESCAPE '\'
                       OR LOWER(COALESCE(category, '')) LIKE ?1 ESCAPE '\'
                    ORDER BY title, id
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(books)
    }

    /// Insert a book; the barcode, if any, must not be on another book
    pub async fn create(&self, book: &CreateBook, added_date: NaiveDate) -> AppResult<Book> {
        let mut tx = begin_write(&self.pool).await?;

        if let Some(ref barcode) = book.barcode {
            ensure_barcode_free(&mut *tx, barcode, None).await?;
        }

        let id = sqlx::query(
            r#"
            INSERT INTO books (title, author, category, quantity, barcode, added_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(book.quantity)
        .bind(&book.barcode)
        .bind(added_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Barcode already assigned to another book"))?
        .last_insert_rowid();

        let created = fetch_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Book {} vanished after insert", id)))?;

        tx.commit().await?;
        Ok(created)
    }

    /// Apply a partial update
    pub async fn update(&self, id: i64, changes: &UpdateBook) -> AppResult<Book> {
        let mut tx = begin_write(&self.pool).await?;

        let mut book = fetch_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(ref title) = changes.title {
            book.title = title.clone();
        }
        if let Some(ref author) = changes.author {
            book.author = Some(author.clone()).filter(|a| !a.is_empty());
        }
        if let Some(ref category) = changes.category {
            book.category = Some(category.clone()).filter(|c| !c.is_empty());
        }
        if let Some(quantity) = changes.quantity {
            book.quantity = quantity;
        }
        if let Some(ref barcode) = changes.barcode {
            ensure_barcode_free(&mut *tx, barcode, Some(id)).await?;
            book.barcode = Some(barcode.clone());
        }

        sqlx::query(
            r#"
            UPDATE books
            SET title = ?, author = ?, category = ?, quantity = ?, barcode = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(book.quantity)
        .bind(&book.barcode)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Barcode already assigned to another book"))?;

        tx.commit().await?;
        Ok(book)
    }

    /// Assign or replace the barcode of a book
    pub async fn assign_barcode(&self, id: i64, barcode: &str) -> AppResult<Book> {
        let mut tx = begin_write(&self.pool).await?;

        let mut book = fetch_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if book.barcode.as_deref() == Some(barcode) {
            return Ok(book);
        }

        ensure_barcode_free(&mut *tx, barcode, Some(id)).await?;

        sqlx::query("UPDATE books SET barcode = ? WHERE id = ?")
            .bind(barcode)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Barcode already assigned to another book"))?;

        tx.commit().await?;

        book.barcode = Some(barcode.to_string());
        Ok(book)
    }

    /// Delete a book unless it is currently out on loan
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        if fetch_by_id(&mut *tx, id).await?.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let issued = loans::count_issued_for_book(&mut *tx, id).await?;
        if issued > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete book {}: {} cop{} currently issued",
                id,
                issued,
                if issued == 1 { "y" } else { "ies" }
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: i64) -> AppResult<Option<Book>>
where
    E: SqliteExecutor<'e>,
{
    let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(book)
}

/// All books in id order
pub(crate) async fn fetch_all<'e, E>(executor: E) -> AppResult<Vec<Book>>
where
    E: SqliteExecutor<'e>,
{
    let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
        .fetch_all(executor)
        .await?;
    Ok(books)
}

/// Fail with `Conflict` when `barcode` is carried by a book other than `owner`
async fn ensure_barcode_free<'e, E>(executor: E, barcode: &str, owner: Option<i64>) -> AppResult<()>
where
    E: SqliteExecutor<'e>,
{
    let holder: Option<(i64, String)> =
        sqlx::query_as("SELECT id, title FROM books WHERE barcode = ?")
            .bind(barcode)
            .fetch_optional(executor)
            .await?;

    match holder {
        Some((holder_id, title)) if Some(holder_id) != owner => Err(AppError::Conflict(format!(
            "Barcode {} already assigned to book {} ({})",
            barcode, holder_id, title
        ))),
        _ => Ok(()),
    }
}
