use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{NewUser, UpdateUser, User};
use super::store::{StoreError, UserStore};

/// Process-local store; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn update_user(&self, id: &str, update: UpdateUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(id).map(|user| {
            update.apply_to(user);
            user.clone()
        }))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let user = User {
            id: format!("user_{}", Uuid::new_v4().simple()),
            email: new_user.email,
            name: new_user.name,
            created_at: Utc::now(),
            metadata: new_user.metadata,
        };
        self.users.write().await.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(id).is_some())
    }
}
