use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::AppError;
use crate::flash::FlashStore;
use crate::{db, seed};

/// Settings for issuing and checking sessions.
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

/// Shared state handed to every handler through `web::Data<AppState>`.
pub struct AppState {
    pub pool: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub flash: FlashStore,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, auth: AuthSettings) -> Self {
        Self {
            pool,
            clock,
            flash: FlashStore::new(),
            auth,
        }
    }

    pub fn from_config(pool: SqlitePool, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self::new(
            pool,
            clock,
            AuthSettings {
                jwt_secret: config.jwt_secret.clone(),
                token_ttl: chrono::Duration::hours(config.token_ttl_hours),
                bcrypt_cost: config.bcrypt_cost,
            },
        )
    }

    /// Fresh in-memory database with the fixture users loaded.
    ///
    /// Uses the cheapest bcrypt cost and a random signing secret; meant for tests and the
    /// scenario harness.
    pub async fn ephemeral(clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let pool = db::connect_in_memory().await?;
        let auth = AuthSettings {
            jwt_secret: Uuid::new_v4().to_string(),
            token_ttl: chrono::Duration::hours(1),
            bcrypt_cost: 4,
        };
        seed::load_fixture_users(&pool, clock.as_ref(), auth.bcrypt_cost).await?;
        Ok(Self::new(pool, clock, auth))
    }
}
