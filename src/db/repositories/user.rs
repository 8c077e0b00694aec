use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, SqlErr, Set,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{feedback, prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            created_at: model.created_at,
        }
    }
}

/// Row to insert. `password_hash` must already be a digest.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Insert failures the caller is expected to recover from.
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("username already exists")]
    UsernameTaken,

    #[error("email already exists")]
    EmailTaken,

    #[error(transparent)]
    Database(#[from] DbErr),
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a user. Uniqueness is left to the database so that two
    /// concurrent registrations cannot both succeed.
    pub async fn create(&self, record: NewUserRecord) -> Result<User, CreateUserError> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(record.username.clone()),
            password: Set(record.password_hash),
            email: Set(record.email.clone()),
            first_name: Set(record.first_name.clone()),
            last_name: Set(record.last_name.clone()),
            created_at: Set(now.clone()),
        };

        Users::insert(active)
            .exec_without_returning(&self.conn)
            .await
            .map_err(classify_insert_error)?;

        info!("Created user: {}", record.username);

        Ok(User {
            username: record.username,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            created_at: now,
        })
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find_by_id(username.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by username together with the stored password hash
    pub async fn get_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = Users::find_by_id(username.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        Ok(user.map(|u| {
            let password_hash = u.password.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Removes a user and every feedback row they own in one transaction.
    /// Returns false if the user did not exist.
    pub async fn delete_with_feedback(&self, username: &str) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let feedback_removed = feedback::Entity::delete_many()
            .filter(feedback::Column::Username.eq(username))
            .exec(&txn)
            .await
            .context("Failed to delete user feedback")?;

        let result = Users::delete_by_id(username.to_string())
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(
                "Removed user {} and {} feedback rows",
                username, feedback_removed.rows_affected
            );
        }
        Ok(removed)
    }
}

fn classify_insert_error(err: DbErr) -> CreateUserError {
    let message = match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => message,
        // SQLite reports primary key clashes with a code sea-orm does not
        // map, but the message is the same "UNIQUE constraint failed: ..."
        _ => {
            let text = err.to_string();
            if !text.contains("UNIQUE constraint failed") && !text.contains("duplicate key") {
                return CreateUserError::Database(err);
            }
            text
        }
    };

    if message.contains("email") {
        CreateUserError::EmailTaken
    } else {
        CreateUserError::UsernameTaken
    }
}
