//! Staff credential check

use crate::{error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Exact comparison against the stored credential pair (no hashing)
    pub async fn validate_user(&self, username: &str, password: &str) -> AppResult<bool> {
        let valid = self
            .repository
            .users
            .credentials_match(username, password)
            .await?;

        if !valid {
            tracing::debug!("Rejected credentials for '{}'", username);
        }
        Ok(valid)
    }
}
