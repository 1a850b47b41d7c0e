use async_trait::async_trait;
use thiserror::Error;

use super::models::{NewUser, UpdateUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage capability behind the user handlers.
///
/// Absence is `Ok(None)` / `Ok(false)`; `Err` is reserved for the store itself failing.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn update_user(&self, id: &str, update: UpdateUser) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError>;
}
