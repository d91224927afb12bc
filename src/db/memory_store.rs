// In-process user store
// Backs STORAGE_BACKEND=memory and the integration tests. A single RwLock
// guards the map, so each operation is atomic with respect to the others.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::user_store::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, User, UserChanges};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
        users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

fn duplicate_email(email: &str) -> StoreError {
    StoreError::DuplicateKey {
        field: "email".to_string(),
        value: email.to_string(),
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user.email, None) {
            return Err(duplicate_email(&user.email));
        }

        let user = user.into_user();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Ok(None);
        }
        if Self::email_taken(&users, &changes.email, Some(id)) {
            return Err(duplicate_email(&changes.email));
        }

        Ok(users.get_mut(&id).map(|user| {
            changes.apply_to(user);
            user.clone()
        }))
    }

    async fn toggle_business(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.is_business = !user.is_business;
            user.updated_at = chrono::Utc::now();
            user.clone()
        }))
    }

    async fn promote_to_admin(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.is_admin = true;
            user.updated_at = chrono::Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.write().await.remove(&id))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
