use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

use crate::auth::hash_password;
use crate::clock::Clock;
use crate::error::AppError;

lazy_static::lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// What a user may do beyond working inside their own groups.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates and deletes lists, sees every group's lists and the comment feed.
    Administrator,
    /// Works with the lists of the groups they belong to.
    Member,
}

impl Role {
    pub fn is_administrator(self) -> bool {
        matches!(self, Role::Administrator)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 4, max = 128))]
    pub password: String, // Hashed before it reaches the database
    pub role: Role,
}

/// A set of users sharing access to the lists it owns.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

impl User {
    pub async fn create(
        pool: &SqlitePool,
        clock: &dyn Clock,
        input: &UserInput,
        cost: u32,
    ) -> Result<User, AppError> {
        input.validate()?;

        if Self::find_by_username(pool, &input.username).await?.is_some() {
            return Err(AppError::BadRequest("Username already taken".into()));
        }

        let password_hash = hash_password(&input.password, cost)?;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, username, email, password_hash, role, created_at",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(password_hash)
        .bind(input.role)
        .bind(clock.now())
        .fetch_one(pool)
        .await?;

        log::info!("Created {:?} user {}", user.role, user.username);
        Ok(user)
    }

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, role, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Groups this user belongs to, by name.
    pub async fn groups(pool: &SqlitePool, user_id: i64) -> Result<Vec<Group>, AppError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT g.id, g.name FROM user_groups g
             JOIN group_members m ON m.group_id = g.id
             WHERE m.user_id = ?
             ORDER BY g.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(groups)
    }
}

impl Group {
    pub async fn create(pool: &SqlitePool, name: &str) -> Result<Group, AppError> {
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO user_groups (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(group)
    }

    pub async fn find_or_create(pool: &SqlitePool, name: &str) -> Result<Group, AppError> {
        let existing = sqlx::query_as::<_, Group>("SELECT id, name FROM user_groups WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        match existing {
            Some(group) => Ok(group),
            None => Self::create(pool, name).await,
        }
    }

    pub async fn find(pool: &SqlitePool, id: i64) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>("SELECT id, name FROM user_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".into()))
    }

    pub async fn all(pool: &SqlitePool) -> Result<Vec<Group>, AppError> {
        let groups = sqlx::query_as::<_, Group>("SELECT id, name FROM user_groups ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(groups)
    }

    pub async fn add_member(&self, pool: &SqlitePool, user_id: i64) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO group_members (group_id, user_id) VALUES (?, ?)")
            .bind(self.id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn has_member(&self, pool: &SqlitePool, user_id: i64) -> Result<bool, AppError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT user_id FROM group_members WHERE group_id = ? AND user_id = ?")
                .bind(self.id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.is_some())
    }

    /// Removes the group together with its lists, tasks and comments.
    pub async fn delete(self, pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_groups WHERE id = ?")
            .bind(self.id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
