//! First-run sample data

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};

use crate::error::AppResult;

const DEFAULT_USER: (&str, &str) = ("admin", "admin");

const SAMPLE_BOOKS: [(&str, &str, &str, i64); 4] = [
    ("Mathematics - Class 10", "R.S. Aggarwal", "Textbook", 5),
    ("Science - Class 9", "Lakhmir Singh", "Textbook", 4),
    ("Python Programming", "John Zelle", "Programming", 2),
    ("Harry Potter and the Sorcerer's Stone", "J.K. Rowling", "Fiction", 3),
];

const SAMPLE_STUDENTS: [(&str, &str, &str); 3] = [
    ("Aman Sharma", "10-A", "9876543210"),
    ("Riya Kapoor", "9-B", "9876501234"),
    ("Rahul Verma", "11-C", "9123456789"),
];

/// Populate each empty table with its defaults. Tables that already hold rows are left alone.
pub async fn seed_if_empty(pool: &Pool<Sqlite>, today: NaiveDate) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;
    if users == 0 {
        sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(DEFAULT_USER.0)
            .bind(DEFAULT_USER.1)
            .execute(&mut *tx)
            .await?;
        tracing::info!("Seeded default user '{}'", DEFAULT_USER.0);
    }

    let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&mut *tx)
        .await?;
    if books == 0 {
        for (title, author, category, quantity) in SAMPLE_BOOKS {
            sqlx::query(
                "INSERT INTO books (title, author, category, quantity, added_date) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(title)
            .bind(author)
            .bind(category)
            .bind(quantity)
            .bind(today)
            .execute(&mut *tx)
            .await?;
        }
        tracing::info!("Seeded {} sample books", SAMPLE_BOOKS.len());
    }

    let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(&mut *tx)
        .await?;
    if students == 0 {
        for (name, class, contact) in SAMPLE_STUDENTS {
            sqlx::query("INSERT INTO students (name, class, contact) VALUES (?, ?, ?)")
                .bind(name)
                .bind(class)
                .bind(contact)
                .execute(&mut *tx)
                .await?;
        }
        tracing::info!("Seeded {} sample students", SAMPLE_STUDENTS.len());
    }

    tx.commit().await?;
    Ok(())
}
