use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::FeedbackId;

pub mod migrator;
pub mod repositories;

pub use repositories::feedback::FeedbackEntry;
pub use repositories::user::{CreateUserError, NewUserRecord, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every connection to an in-memory database is a separate database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn feedback_repo(&self) -> repositories::feedback::FeedbackRepository {
        repositories::feedback::FeedbackRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, record: NewUserRecord) -> Result<User, CreateUserError> {
        self.user_repo().create(record).await
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn find_user_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_username_with_password(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn delete_user(&self, username: &str) -> Result<bool> {
        self.user_repo().delete_with_feedback(username).await
    }

    // Feedback

    pub async fn create_feedback(
        &self,
        username: &str,
        title: &str,
        content: &str,
    ) -> Result<FeedbackEntry> {
        self.feedback_repo().create(username, title, content).await
    }

    pub async fn find_feedback_by_id(&self, id: FeedbackId) -> Result<Option<FeedbackEntry>> {
        self.feedback_repo().get(id).await
    }

    pub async fn list_feedback_for_user(&self, username: &str) -> Result<Vec<FeedbackEntry>> {
        self.feedback_repo().list_for_user(username).await
    }

    pub async fn count_feedback_for_user(&self, username: &str) -> Result<u64> {
        self.feedback_repo().count_for_user(username).await
    }

    pub async fn update_feedback(&self, id: FeedbackId, title: &str, content: &str) -> Result<bool> {
        self.feedback_repo().update(id, title, content).await
    }

    pub async fn delete_feedback(&self, id: FeedbackId) -> Result<bool> {
        self.feedback_repo().delete(id).await
    }
}
