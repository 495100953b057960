use async_trait::async_trait;

use warden_application::{StoredUser, UserRepository, VersionedWrite};
use warden_core::{AppError, AppResult};
use warden_domain::{EmailAddress, User, UserId};

use super::{InMemoryAccessStore, roles_not_found};

#[async_trait]
impl UserRepository for InMemoryAccessStore {
    async fn list_users(&self) -> AppResult<Vec<StoredUser>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<StoredUser>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<StoredUser>> {
        let state = self.state.read().await;
        Ok(state
            .user_ids_by_email
            .get(email)
            .and_then(|user_id| state.users.get(user_id))
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<StoredUser> {
        let mut state = self.state.write().await;

        if state.user_ids_by_email.contains_key(user.email()) {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                user.email()
            )));
        }

        if state.users.contains_key(&user.id()) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                user.id()
            )));
        }

        let stored = StoredUser { user, version: 1 };
        state
            .user_ids_by_email
            .insert(stored.user.email().clone(), stored.user.id());
        state.users.insert(stored.user.id(), stored.clone());
        Ok(stored)
    }

    async fn update_user(&self, user: User, expected_version: u64) -> AppResult<VersionedWrite> {
        let mut state = self.state.write().await;
        let Some(stored) = state.users.get(&user.id()) else {
            return Ok(VersionedWrite::Missing);
        };

        if stored.version != expected_version {
            return Ok(VersionedWrite::Stale);
        }

        if stored.user.email() != user.email() {
            return Err(AppError::Validation(format!(
                "email of user '{}' cannot be changed",
                user.id()
            )));
        }

        let missing = state.missing_roles(user.role_ids());
        if !missing.is_empty() {
            return Err(roles_not_found(&missing));
        }

        let version = expected_version + 1;
        state.users.insert(user.id(), StoredUser { user, version });
        Ok(VersionedWrite::Applied { version })
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(stored) = state.users.remove(&user_id) else {
            return Ok(false);
        };

        state.user_ids_by_email.remove(stored.user.email());
        Ok(true)
    }
}
