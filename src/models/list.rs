use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::Group;

lazy_static::lazy_static! {
    static ref NON_SLUG_CHARS: regex::Regex = regex::Regex::new(r"[^\w\s-]").unwrap();
    static ref SLUG_SEPARATORS: regex::Regex = regex::Regex::new(r"[-\s]+").unwrap();
}

/// Lowercases `name` and joins its words with hyphens: `"A new List"` becomes `"a-new-list"`.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    SLUG_SEPARATORS
        .replace_all(stripped.trim(), "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

/// A named list of tasks owned by a group.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskList {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub group_id: i64,
}

/// A list as shown on the index page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ListSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub group_name: String,
    pub incomplete: i64,
}

impl ListSummary {
    pub fn url(&self) -> String {
        list_url(self.id, &self.slug)
    }
}

/// Submitted by the "Create new todo list" form.
#[derive(Debug, Deserialize, Validate)]
pub struct ListForm {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    /// Owning group; defaults to the creator's first group.
    pub group: Option<i64>,
}

impl ListForm {
    /// Trims the name and validates what is left.
    pub fn cleaned(mut self) -> Result<ListForm, AppError> {
        self.name = self.name.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

fn list_url(id: Uuid, slug: &str) -> String {
    format!("/lists/{}/{}/", id, slug)
}

impl TaskList {
    pub fn url(&self) -> String {
        list_url(self.id, &self.slug)
    }

    pub fn completed_url(&self) -> String {
        format!("{}completed/", self.url())
    }

    pub fn delete_url(&self) -> String {
        format!("{}delete/", self.url())
    }

    pub async fn create(pool: &SqlitePool, name: &str, group_id: i64) -> Result<TaskList, AppError> {
        let name = name.trim();
        let mut slug = slugify(name);
        if slug.is_empty() {
            slug = "list".to_string();
        }

        let taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM task_lists WHERE group_id = ? AND slug = ?")
                .bind(group_id)
                .bind(&slug)
                .fetch_optional(pool)
                .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(format!(
                "The group already has a list called \"{}\"",
                name
            )));
        }

        let list = sqlx::query_as::<_, TaskList>(
            "INSERT INTO task_lists (id, name, slug, group_id) VALUES (?, ?, ?, ?)
             RETURNING id, name, slug, group_id",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(group_id)
        .fetch_one(pool)
        .await?;
        Ok(list)
    }

    pub async fn find(pool: &SqlitePool, id: Uuid) -> Result<TaskList, AppError> {
        sqlx::query_as::<_, TaskList>("SELECT id, name, slug, group_id FROM task_lists WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("List not found".into()))
    }

    /// Lists the user may open: all of them for administrators, their groups' otherwise.
    pub async fn visible_to(
        pool: &SqlitePool,
        user: &AuthenticatedUser,
    ) -> Result<Vec<ListSummary>, AppError> {
        let base = "SELECT l.id, l.name, l.slug, g.name AS group_name,
                (SELECT COUNT(*) FROM tasks t WHERE t.task_list_id = l.id AND t.completed = 0) AS incomplete
             FROM task_lists l JOIN user_groups g ON g.id = l.group_id";

        let administrator = user.role.is_administrator();
        let sql = if administrator {
            format!("{} ORDER BY g.name, l.name", base)
        } else {
            format!(
                "{} WHERE l.group_id IN (SELECT group_id FROM group_members WHERE user_id = ?)
                 ORDER BY g.name, l.name",
                base
            )
        };

        let mut query = sqlx::query_as::<_, ListSummary>(&sql);
        if !administrator {
            query = query.bind(user.id);
        }
        let lists = query.fetch_all(pool).await?;
        Ok(lists)
    }

    /// Fails with `Forbidden` unless the user is an administrator or a member of the owning group.
    pub async fn ensure_visible(
        &self,
        pool: &SqlitePool,
        user: &AuthenticatedUser,
    ) -> Result<(), AppError> {
        if user.role.is_administrator() {
            return Ok(());
        }
        let group = Group::find(pool, self.group_id).await?;
        if group.has_member(pool, user.id).await? {
            Ok(())
        } else {
            log::warn!("{} tried to open list {} of another group", user.username, self.id);
            Err(AppError::Forbidden(
                "You do not have permission to view this list.".into(),
            ))
        }
    }

    /// `(incomplete, completed)` task counts.
    pub async fn task_counts(&self, pool: &SqlitePool) -> Result<(i64, i64), AppError> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(CASE WHEN completed = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0)
             FROM tasks WHERE task_list_id = ?",
        )
        .bind(self.id)
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }

    /// Deletes the list; its tasks and their comments go with it.
    pub async fn delete(self, pool: &SqlitePool) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM task_lists WHERE id = ?")
            .bind(self.id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("List not found".into()));
        }
        log::info!("Deleted list {} ({})", self.name, self.id);
        Ok(())
    }
}
