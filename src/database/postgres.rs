use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::models::user::Metadata;
use super::models::{NewUser, UpdateUser, User};
use super::store::{StoreError, UserStore};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id          TEXT PRIMARY KEY,
        email       TEXT NOT NULL,
        name        TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        metadata    JSONB
    )
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    metadata: Option<Json<Metadata>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            created_at: row.created_at,
            metadata: row.metadata.map(|Json(m)| m),
        }
    }
}

/// Pool exhaustion and shutdown mean the store is unreachable, not that the query failed
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
        other => StoreError::Database(other),
    }
}

/// `users` table in the database named by `DATABASE_URL`
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Connect and make sure the `users` table exists
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(store_error)?;

        sqlx::query(CREATE_USERS_TABLE).execute(&pool).await.map_err(store_error)?;
        info!("Postgres user store ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, created_at, metadata FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(User::from))
    }

    async fn update_user(&self, id: &str, update: UpdateUser) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 metadata = COALESCE($4, metadata)
             WHERE id = $1
             RETURNING id, email, name, created_at, metadata",
        )
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.metadata.map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(User::from))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, name, metadata)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, name, created_at, metadata",
        )
        .bind(format!("user_{}", Uuid::new_v4().simple()))
        .bind(new_user.email)
        .bind(new_user.name)
        .bind(new_user.metadata.map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
