//! Catalog management service (books)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

use super::{optional_text, today};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books ordered by title
    pub async fn list_books(&self, search: Option<&str>) -> AppResult<Vec<Book>> {
        self.repository.books.list(search).await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Look a book up by its scanned barcode
    pub async fn find_book_by_barcode(&self, barcode: &str) -> AppResult<Book> {
        let barcode = barcode.trim();
        self.repository
            .books
            .get_by_barcode(barcode)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book with barcode {}", barcode)))
    }

    /// Add a book, optionally with its barcode. The added date is today.
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;

        let book = CreateBook {
            title: book.title.trim().to_string(),
            author: optional_text(book.author),
            category: optional_text(book.category),
            quantity: book.quantity,
            barcode: optional_text(book.barcode),
        };

        let created = self.repository.books.create(&book, today()).await?;
        tracing::info!("Added book {} '{}' ({} copies)", created.id, created.title, created.quantity);
        Ok(created)
    }

    /// Edit a book's fields
    pub async fn update_book(&self, id: i64, changes: UpdateBook) -> AppResult<Book> {
        changes.validate()?;

        let barcode = match changes.barcode {
            Some(barcode) if barcode.trim().is_empty() => {
                return Err(AppError::Validation("Barcode cannot be empty".to_string()));
            }
            other => other.map(|b| b.trim().to_string()),
        };

        let changes = UpdateBook {
            title: changes.title.map(|t| t.trim().to_string()),
            author: changes.author.map(|a| a.trim().to_string()),
            category: changes.category.map(|c| c.trim().to_string()),
            quantity: changes.quantity,
            barcode,
        };

        let updated = self.repository.books.update(id, &changes).await?;
        tracing::info!("Updated book {}", id);
        Ok(updated)
    }

    /// Assign (or replace) a book's barcode; fails if another book already carries it
    pub async fn assign_barcode(&self, id: i64, barcode: &str) -> AppResult<Book> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(AppError::Validation("Barcode is required".to_string()));
        }

        let book = self.repository.books.assign_barcode(id, barcode).await?;
        tracing::info!("Assigned barcode {} to book {}", barcode, id);
        Ok(book)
    }

    /// Delete a book that has no copy out on loan
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        if let Err(e) = self.repository.books.delete(id).await {
            if matches!(e, AppError::Conflict(_)) {
                tracing::warn!("Refused to delete book {}: {}", id, e);
            }
            return Err(e);
        }
        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
