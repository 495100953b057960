use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::{Application, ApplicationId, Role, RoleId};

/// Repository port for applications and the roles they own.
///
/// Deleting a role, directly or through its application, must also strip the
/// role id from every user and invitation in the same atomic step.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Inserts a new application.
    async fn create_application(&self, application: Application) -> AppResult<()>;

    /// Lists every application.
    async fn list_applications(&self) -> AppResult<Vec<Application>>;

    /// Finds an application by identifier.
    async fn find_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Option<Application>>;

    /// Replaces an existing application. Returns `false` when it is missing.
    async fn update_application(&self, application: Application) -> AppResult<bool>;

    /// Deletes an application together with its roles.
    ///
    /// Returns the removed role ids, or `None` when the application is missing.
    async fn delete_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Option<Vec<RoleId>>>;

    /// Inserts a role.
    ///
    /// Fails with `NotFound` when the owning application is missing and with
    /// `Conflict` when the name is already used inside that application.
    async fn create_role(&self, role: Role) -> AppResult<()>;

    /// Lists roles owned by an application.
    async fn list_roles(&self, application_id: ApplicationId) -> AppResult<Vec<Role>>;

    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Returns the subset of `role_ids` that does not resolve to a role.
    async fn find_missing_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleId>>;

    /// Replaces an existing role. Returns `false` when it is missing.
    async fn update_role(&self, role: Role) -> AppResult<bool>;

    /// Deletes a role. Returns `false` when it is missing.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool>;
}
