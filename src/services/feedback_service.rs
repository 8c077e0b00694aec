//! Domain service for feedback records and their ownership rule.

use thiserror::Error;

use crate::db::FeedbackEntry;
use crate::domain::FeedbackId;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Feedback not found: {0}")]
    NotFound(FeedbackId),

    /// The acting user does not own the feedback (or the user it would be
    /// filed under).
    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for FeedbackError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FeedbackError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Validated title and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub title: String,
    pub content: String,
}

#[async_trait::async_trait]
pub trait FeedbackService: Send + Sync {
    /// Files a new entry under `owner`.
    ///
    /// # Errors
    ///
    /// [`FeedbackError::Forbidden`] unless `actor == owner`.
    async fn create(
        &self,
        actor: &str,
        owner: &str,
        draft: FeedbackDraft,
    ) -> Result<FeedbackEntry, FeedbackError>;

    /// Loads an entry the actor is allowed to change.
    ///
    /// # Errors
    ///
    /// [`FeedbackError::NotFound`] for unknown ids, [`FeedbackError::Forbidden`]
    /// for entries owned by somebody else.
    async fn get_owned(&self, actor: &str, id: FeedbackId)
    -> Result<FeedbackEntry, FeedbackError>;

    /// Replaces title and content and returns the updated entry.
    async fn update(
        &self,
        actor: &str,
        id: FeedbackId,
        draft: FeedbackDraft,
    ) -> Result<FeedbackEntry, FeedbackError>;

    /// Deletes the entry and returns what was removed.
    async fn delete(&self, actor: &str, id: FeedbackId) -> Result<FeedbackEntry, FeedbackError>;
}
