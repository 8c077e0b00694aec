//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::services::account_service::{AccountError, AccountService, Profile};

pub struct SeaOrmAccountService {
    store: Store,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn authorize(actor: &str, username: &str) -> Result<(), AccountError> {
        if actor == username {
            Ok(())
        } else {
            warn!(actor, target_user = username, "Rejected access to another account");
            Err(AccountError::Forbidden)
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn profile(&self, actor: &str, username: &str) -> Result<Profile, AccountError> {
        Self::authorize(actor, username)?;

        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AccountError::NotFound(username.to_string()))?;

        let feedback = self.store.list_feedback_for_user(&user.username).await?;

        Ok(Profile { user, feedback })
    }

    async fn delete_account(&self, actor: &str, username: &str) -> Result<(), AccountError> {
        Self::authorize(actor, username)?;

        if !self.store.delete_user(username).await? {
            return Err(AccountError::NotFound(username.to_string()));
        }

        info!(username, "Account deleted by owner");
        Ok(())
    }
}
