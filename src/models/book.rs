//! Book (catalog) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::not_blank;

/// Book record as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
    /// Copies currently on the shelf
    pub quantity: i64,
    pub barcode: Option<String>,
    pub added_date: NaiveDate,
}

/// Book search query
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive match on title, author or category
    pub search: Option<String>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
    pub barcode: Option<String>,
}

/// Update book request; absent fields are left untouched,
/// empty author/category clear the stored value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(custom(function = "not_blank", message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i64>,
    pub barcode: Option<String>,
}

/// Assign barcode request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignBarcode {
    #[validate(custom(function = "not_blank", message = "Barcode is required"))]
    pub barcode: String,
}
