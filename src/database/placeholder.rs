use async_trait::async_trait;
use chrono::Utc;

use super::models::{NewUser, UpdateUser, User};
use super::store::{StoreError, UserStore};

const DEFAULT_EMAIL: &str = "user@example.com";
const DEFAULT_NAME: &str = "John Doe";

/// Stand-in store with nothing behind it: reads fabricate a record, writes echo their input.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderUserStore;

impl PlaceholderUserStore {
    fn fabricate(id: &str) -> User {
        User {
            id: id.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            name: DEFAULT_NAME.to_string(),
            created_at: Utc::now(),
            metadata: None,
        }
    }
}

#[async_trait]
impl UserStore for PlaceholderUserStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(Some(Self::fabricate(id)))
    }

    async fn update_user(&self, id: &str, update: UpdateUser) -> Result<Option<User>, StoreError> {
        let mut user = Self::fabricate(id);
        // Blank strings fall back to the fabricated defaults
        let update = UpdateUser {
            name: update.name.filter(|n| !n.is_empty()),
            email: update.email.filter(|e| !e.is_empty()),
            metadata: update.metadata,
        };
        update.apply_to(&mut user);
        Ok(Some(user))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        Ok(User {
            id: "new_user_id".to_string(),
            email: new_user.email,
            name: new_user.name,
            created_at: Utc::now(),
            metadata: new_user.metadata,
        })
    }

    async fn delete_user(&self, _id: &str) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_fabricates_requested_id() {
        let user = PlaceholderUserStore.get_user("user_123").await.unwrap().unwrap();
        assert_eq!(user.id, "user_123");
        assert_eq!(user.email, DEFAULT_EMAIL);
        assert_eq!(user.name, DEFAULT_NAME);
    }

    #[tokio::test]
    async fn test_update_echoes_input() {
        let update = UpdateUser {
            name: Some("Updated Name".to_string()),
            email: Some("updated@example.com".to_string()),
            metadata: None,
        };
        let user = PlaceholderUserStore.update_user("user_123", update).await.unwrap().unwrap();
        assert_eq!(user.name, "Updated Name");
        assert_eq!(user.email, "updated@example.com");
    }

    #[tokio::test]
    async fn test_blank_update_keeps_defaults() {
        let update = UpdateUser {
            name: Some(String::new()),
            email: Some(String::new()),
            metadata: None,
        };
        let user = PlaceholderUserStore.update_user("user_123", update).await.unwrap().unwrap();
        assert_eq!(user.name, DEFAULT_NAME);
        assert_eq!(user.email, DEFAULT_EMAIL);
    }

    #[tokio::test]
    async fn test_create_and_delete() {
        let created = PlaceholderUserStore
            .create_user(NewUser {
                email: "new@example.com".to_string(),
                name: "New User".to_string(),
                metadata: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, "new_user_id");
        assert_eq!(created.email, "new@example.com");
        assert!(PlaceholderUserStore.delete_user("user_123").await.unwrap());
    }
}
