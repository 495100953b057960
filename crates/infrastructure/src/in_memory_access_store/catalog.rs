use async_trait::async_trait;

use warden_application::CatalogRepository;
use warden_core::{AppError, AppResult};
use warden_domain::{Application, ApplicationId, Role, RoleId};

use super::InMemoryAccessStore;

#[async_trait]
impl CatalogRepository for InMemoryAccessStore {
    async fn create_application(&self, application: Application) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state.applications.contains_key(&application.id()) {
            return Err(AppError::Conflict(format!(
                "application '{}' already exists",
                application.id()
            )));
        }

        state.applications.insert(application.id(), application);
        Ok(())
    }

    async fn list_applications(&self) -> AppResult<Vec<Application>> {
        Ok(self
            .state
            .read()
            .await
            .applications
            .values()
            .cloned()
            .collect())
    }

    async fn find_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Option<Application>> {
        Ok(self
            .state
            .read()
            .await
            .applications
            .get(&application_id)
            .cloned())
    }

    async fn update_application(&self, application: Application) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(stored) = state.applications.get_mut(&application.id()) else {
            return Ok(false);
        };

        *stored = application;
        Ok(true)
    }

    async fn delete_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Option<Vec<RoleId>>> {
        let mut state = self.state.write().await;
        if state.applications.remove(&application_id).is_none() {
            return Ok(None);
        }

        let removed: Vec<RoleId> = state
            .roles
            .values()
            .filter(|role| role.application_id() == application_id)
            .map(Role::id)
            .collect();
        for role_id in &removed {
            state.roles.remove(role_id);
        }
        state.detach_roles(&removed);

        Ok(Some(removed))
    }

    async fn create_role(&self, role: Role) -> AppResult<()> {
        let mut state = self.state.write().await;

        if !state.applications.contains_key(&role.application_id()) {
            return Err(AppError::NotFound(format!(
                "application '{}' does not exist",
                role.application_id()
            )));
        }

        let duplicate = state.roles.values().any(|existing| {
            existing.application_id() == role.application_id()
                && existing.has_name(role.name().as_str())
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists in application '{}'",
                role.name(),
                role.application_id()
            )));
        }

        state.roles.insert(role.id(), role);
        Ok(())
    }

    async fn list_roles(&self, application_id: ApplicationId) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .filter(|role| role.application_id() == application_id)
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn find_missing_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleId>> {
        Ok(self.state.read().await.missing_roles(role_ids))
    }

    async fn update_role(&self, role: Role) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(stored) = state.roles.get_mut(&role.id()) else {
            return Ok(false);
        };

        if stored.application_id() != role.application_id() || stored.name() != role.name() {
            return Err(AppError::Validation(format!(
                "role '{}' can only change its permissions",
                role.id()
            )));
        }

        *stored = role;
        Ok(true)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.roles.remove(&role_id).is_none() {
            return Ok(false);
        }

        state.detach_roles(&[role_id]);
        Ok(true)
    }
}
