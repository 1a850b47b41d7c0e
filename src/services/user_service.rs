use std::sync::Arc;
use std::time::Instant;

use crate::database::models::{NewUser, UpdateUser, User};
use crate::database::{StoreError, UserStore};

/// User operations over whichever store was configured at startup
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let started = Instant::now();
        let result = self.store.get_user(id).await;
        log_operation("select", started, &result);
        result
    }

    pub async fn update_user(&self, id: &str, update: UpdateUser) -> Result<Option<User>, StoreError> {
        let started = Instant::now();
        let result = self.store.update_user(id, update).await;
        log_operation("update", started, &result);
        result
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let started = Instant::now();
        let result = self.store.create_user(new_user).await;
        log_operation("insert", started, &result);
        result
    }

    pub async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        let started = Instant::now();
        let result = self.store.delete_user(id).await;
        log_operation("delete", started, &result);
        result
    }
}

fn log_operation<T>(operation: &str, started: Instant, result: &Result<T, StoreError>) {
    let duration_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::debug!(operation, table = "users", duration_ms, "Database operation"),
        Err(e) => tracing::error!(operation, table = "users", duration_ms, error = %e, "Database error"),
    }
}
