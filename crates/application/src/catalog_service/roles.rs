use tracing::info;

use warden_core::{AppError, AppResult};
use warden_domain::{ApplicationId, AuditAction, Role, RoleId, parse_permission_grants};

use super::{CatalogService, CreateRoleInput};

impl CatalogService {
    /// Creates a role inside an existing application.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let permissions = parse_permission_grants(input.permissions)?;
        let role = Role::new(input.application_id, input.name, permissions)?;

        if self.get_application(input.application_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "application '{}' does not exist",
                input.application_id
            )));
        }

        self.storage_policy
            .call("create_role", self.repository.create_role(role.clone()))
            .await?;

        info!(
            role_id = %role.id(),
            application_id = %role.application_id(),
            name = role.name().as_str(),
            "created role"
        );
        self.record_event(
            AuditAction::RoleCreated,
            "role",
            role.id().to_string(),
            format!("created role '{}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Returns roles owned by an application, ordered by name.
    pub async fn list_roles(&self, application_id: ApplicationId) -> AppResult<Vec<Role>> {
        let mut roles = self
            .storage_policy
            .call("list_roles", self.repository.list_roles(application_id))
            .await?;
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    /// Returns a role by identifier, if it exists.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.storage_policy
            .call("find_role", self.repository.find_role(role_id))
            .await
    }

    /// Replaces the permission grants of a role.
    pub async fn set_role_permissions(
        &self,
        role_id: RoleId,
        permissions: Vec<(String, bool)>,
    ) -> AppResult<bool> {
        let permissions = parse_permission_grants(permissions)?;

        let Some(mut role) = self.get_role(role_id).await? else {
            return Ok(false);
        };

        if role.permissions() == &permissions {
            return Ok(true);
        }
        role.replace_permissions(permissions);

        let updated = self
            .storage_policy
            .call("update_role", self.repository.update_role(role.clone()))
            .await?;

        if updated {
            self.record_event(
                AuditAction::RolePermissionsChanged,
                "role",
                role_id.to_string(),
                format!("role '{}' now has {} grant(s)", role.name(), role.permissions().len()),
            )
            .await?;
        }

        Ok(updated)
    }

    /// Deletes a role and strips it from every user and invitation.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        let deleted = self
            .storage_policy
            .call("delete_role", self.repository.delete_role(role_id))
            .await?;

        if deleted {
            info!(role_id = %role_id, "deleted role");
            self.record_event(
                AuditAction::RoleDeleted,
                "role",
                role_id.to_string(),
                "role deleted".to_owned(),
            )
            .await?;
        }

        Ok(deleted)
    }
}
