//! Users repository for the staff credential table

use sqlx::{Pool, Sqlite, SqliteExecutor};

use crate::{error::AppResult, models::user::User};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Exact match of a stored credential pair
    pub async fn credentials_match(&self, username: &str, password: &str) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? AND password = ?")
                .bind(username)
                .bind(password)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

/// All users in username order
pub(crate) async fn fetch_all<'e, E>(executor: E) -> AppResult<Vec<User>>
where
    E: SqliteExecutor<'e>,
{
    let users = sqlx::query_as::<_, User>("SELECT username, password FROM users ORDER BY username")
        .fetch_all(executor)
        .await?;
    Ok(users)
}
