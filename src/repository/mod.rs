//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod students;
pub mod users;

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, Transaction,
};

use crate::{config::DatabaseConfig, error::AppResult};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub books: books::BooksRepository,
    pub students: students::StudentsRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            students: students::StudentsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Open the SQLite pool described by the configuration
pub async fn connect(config: &DatabaseConfig) -> AppResult<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(config.create_if_missing);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &Pool<Sqlite>) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(sqlx::Error::from)?;
    Ok(())
}

/// Begin a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before writing must later upgrade its shared
/// lock, and SQLite refuses that upgrade with `SQLITE_BUSY` while another
/// connection is reading. Taking the lock up front makes concurrent writers wait
/// on the busy timeout instead.
pub(crate) async fn begin_write(pool: &Pool<Sqlite>) -> AppResult<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;

    // Matches no row; preparing the write is enough to take the lock
    sqlx::query("UPDATE books SET quantity = quantity WHERE 0")
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

/// Build a `LIKE` pattern matching `term` as a literal, case-insensitive substring.
/// Use with `LOWER(column) LIKE ? ESCAPE '\'`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Trim a search term, treating blank input as no filter
pub(crate) fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}
