use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::domain::FeedbackId;
use crate::entities::{feedback, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub id: FeedbackId,
    pub title: String,
    pub content: String,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<feedback::Model> for FeedbackEntry {
    fn from(model: feedback::Model) -> Self {
        Self {
            id: FeedbackId::new(model.id),
            title: model.title,
            content: model.content,
            username: model.username,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct FeedbackRepository {
    conn: DatabaseConnection,
}

impl FeedbackRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, username: &str, title: &str, content: &str) -> Result<FeedbackEntry> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = feedback::ActiveModel {
            title: Set(title.to_string()),
            content: Set(content.to_string()),
            username: Set(username.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };

        let result = Feedback::insert(active)
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to insert feedback for {username}"))?;

        let id = FeedbackId::new(result.last_insert_id);
        info!("Added feedback {} for {}", id, username);

        Ok(FeedbackEntry {
            id,
            title: title.to_string(),
            content: content.to_string(),
            username: username.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get(&self, id: FeedbackId) -> Result<Option<FeedbackEntry>> {
        let row = Feedback::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query feedback by id")?;

        Ok(row.map(FeedbackEntry::from))
    }

    pub async fn list_for_user(&self, username: &str) -> Result<Vec<FeedbackEntry>> {
        let rows = Feedback::find()
            .filter(feedback::Column::Username.eq(username))
            .order_by_asc(feedback::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list feedback")?;

        Ok(rows.into_iter().map(FeedbackEntry::from).collect())
    }

    pub async fn count_for_user(&self, username: &str) -> Result<u64> {
        Feedback::find()
            .filter(feedback::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to count feedback")
    }

    /// Rewrites title and content. Owner and id are never touched.
    pub async fn update(&self, id: FeedbackId, title: &str, content: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = Feedback::update_many()
            .col_expr(
                feedback::Column::Title,
                sea_orm::sea_query::Expr::value(title),
            )
            .col_expr(
                feedback::Column::Content,
                sea_orm::sea_query::Expr::value(content),
            )
            .col_expr(
                feedback::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(feedback::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to update feedback")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete(&self, id: FeedbackId) -> Result<bool> {
        let result = Feedback::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete feedback")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed feedback {}", id);
        }
        Ok(removed)
    }
}
