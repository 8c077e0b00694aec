//! Domain service for viewing and deleting one's own account.

use thiserror::Error;

use crate::db::{FeedbackEntry, User};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User not found: {0}")]
    NotFound(String),

    /// The acting user does not own the account.
    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Everything the profile page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user: User,
    pub feedback: Vec<FeedbackEntry>,
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Loads `username`'s profile on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// [`AccountError::Forbidden`] if `actor` is somebody else, checked
    /// before the lookup so foreign and missing accounts look alike;
    /// [`AccountError::NotFound`] if the actor's own row is gone.
    async fn profile(&self, actor: &str, username: &str) -> Result<Profile, AccountError>;

    /// Deletes `username` and all their feedback in one transaction.
    ///
    /// # Errors
    ///
    /// [`AccountError::Forbidden`] if `actor` is somebody else,
    /// [`AccountError::NotFound`] if the row is already gone; nothing is
    /// deleted in either case.
    async fn delete_account(&self, actor: &str, username: &str) -> Result<(), AccountError>;
}
