//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::{CreateUserError, NewUserRecord, Store, User};
use crate::services::auth_service::{AuthError, AuthService, Registration};
use crate::services::credentials::CredentialHasher;

pub struct SeaOrmAuthService {
    store: Store,
    hasher: CredentialHasher,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let password_hash = self.hasher.hash_async(registration.password).await?;

        let record = NewUserRecord {
            username: registration.username,
            password_hash,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
        };

        let user = self.store.create_user(record).await.map_err(|e| match e {
            CreateUserError::UsernameTaken => AuthError::UsernameTaken,
            CreateUserError::EmailTaken => AuthError::EmailTaken,
            CreateUserError::Database(err) => AuthError::from(err),
        })?;

        info!(username = %user.username, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some((user, digest)) = self.store.find_user_with_password(username).await? else {
            self.hasher.verify_dummy(password.to_string()).await?;
            warn!("Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let is_valid = self
            .hasher
            .verify_async(password.to_string(), digest)
            .await?;

        if !is_valid {
            warn!("Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        info!(username = %user.username, "User logged in");
        Ok(user)
    }
}
