use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::exactly_one;

/// Number of body characters kept in a snippet.
pub const SNIPPET_LENGTH: usize = 35;

const SELECT_COMMENT: &str = "SELECT c.id, c.task_id, c.author_id, u.username AS author_username, c.body, c.date \
     FROM comments c JOIN users u ON u.id = c.author_id";

/// `"<author> - <first 35 characters of body>..."`.
///
/// Counts characters, not bytes, and always appends the ellipsis, even when the body is
/// shorter than the limit.
pub fn snippet(author: &str, body: &str) -> String {
    let head: String = body.chars().take(SNIPPET_LENGTH).collect();
    format!("{} - {}...", author, head)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: i64,
    pub author_username: String,
    pub body: String,
    pub date: DateTime<Utc>,
}

/// Posted from the task detail page.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(rename = "comment-body")]
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

impl Comment {
    pub fn snippet(&self) -> String {
        snippet(&self.author_username, &self.body)
    }

    pub async fn create(
        pool: &SqlitePool,
        clock: &dyn Clock,
        task_id: Uuid,
        author_id: i64,
        body: &str,
    ) -> Result<Comment, AppError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO comments (id, task_id, author_id, body, date) VALUES (?, ?, ?, ?, ?)")
            .bind(id)
            .bind(task_id)
            .bind(author_id)
            .bind(body)
            .bind(clock.now())
            .execute(pool)
            .await?;

        sqlx::query_as::<_, Comment>(&format!("{} WHERE c.id = ?", SELECT_COMMENT))
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(AppError::from)
    }

    /// Comments on a task, oldest first.
    pub async fn for_task(pool: &SqlitePool, task_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let comments =
            sqlx::query_as::<_, Comment>(&format!("{} WHERE c.task_id = ? ORDER BY c.date", SELECT_COMMENT))
                .bind(task_id)
                .fetch_all(pool)
                .await?;
        Ok(comments)
    }

    /// Newest comments across all lists.
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Comment>, AppError> {
        let comments =
            sqlx::query_as::<_, Comment>(&format!("{} ORDER BY c.date DESC LIMIT ?", SELECT_COMMENT))
                .bind(limit)
                .fetch_all(pool)
                .await?;
        Ok(comments)
    }

    /// The one comment written by `author_id`; several matches are an error.
    pub async fn get_by_author(pool: &SqlitePool, author_id: i64) -> Result<Comment, AppError> {
        let comments =
            sqlx::query_as::<_, Comment>(&format!("{} WHERE c.author_id = ?", SELECT_COMMENT))
                .bind(author_id)
                .fetch_all(pool)
                .await?;
        exactly_one(comments, "Comment")
    }

    pub async fn delete(self, pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(self.id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
