//! `SeaORM` implementation of the `FeedbackService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::{FeedbackEntry, Store};
use crate::domain::FeedbackId;
use crate::services::feedback_service::{FeedbackDraft, FeedbackError, FeedbackService};

pub struct SeaOrmFeedbackService {
    store: Store,
}

impl SeaOrmFeedbackService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn authorize(actor: &str, owner: &str) -> Result<(), FeedbackError> {
        if actor == owner {
            Ok(())
        } else {
            warn!(actor, owner, "Rejected feedback change by non-owner");
            Err(FeedbackError::Forbidden)
        }
    }
}

#[async_trait]
impl FeedbackService for SeaOrmFeedbackService {
    async fn create(
        &self,
        actor: &str,
        owner: &str,
        draft: FeedbackDraft,
    ) -> Result<FeedbackEntry, FeedbackError> {
        Self::authorize(actor, owner)?;

        let entry = self
            .store
            .create_feedback(owner, &draft.title, &draft.content)
            .await?;

        Ok(entry)
    }

    async fn get_owned(
        &self,
        actor: &str,
        id: FeedbackId,
    ) -> Result<FeedbackEntry, FeedbackError> {
        let entry = self
            .store
            .find_feedback_by_id(id)
            .await?
            .ok_or(FeedbackError::NotFound(id))?;

        Self::authorize(actor, &entry.username)?;
        Ok(entry)
    }

    async fn update(
        &self,
        actor: &str,
        id: FeedbackId,
        draft: FeedbackDraft,
    ) -> Result<FeedbackEntry, FeedbackError> {
        let entry = self.get_owned(actor, id).await?;

        if !self
            .store
            .update_feedback(id, &draft.title, &draft.content)
            .await?
        {
            return Err(FeedbackError::NotFound(id));
        }

        info!(feedback_id = %id, username = %entry.username, "Feedback updated");

        Ok(FeedbackEntry {
            title: draft.title,
            content: draft.content,
            ..entry
        })
    }

    async fn delete(&self, actor: &str, id: FeedbackId) -> Result<FeedbackEntry, FeedbackError> {
        let entry = self.get_owned(actor, id).await?;

        if !self.store.delete_feedback(id).await? {
            return Err(FeedbackError::NotFound(id));
        }

        Ok(entry)
    }
}
