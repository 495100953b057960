use tracing::info;

use warden_core::AppResult;
use warden_domain::{Application, ApplicationId, AuditAction};

use super::{CatalogService, CreateApplicationInput};

impl CatalogService {
    /// Registers a new active application.
    pub async fn create_application(&self, input: CreateApplicationInput) -> AppResult<Application> {
        let application = Application::new(&input.url, input.name, input.description)?;

        self.storage_policy
            .call(
                "create_application",
                self.repository.create_application(application.clone()),
            )
            .await?;

        info!(
            application_id = %application.id(),
            name = application.name().as_str(),
            "registered application"
        );
        self.record_event(
            AuditAction::ApplicationCreated,
            "application",
            application.id().to_string(),
            format!("registered application '{}'", application.name()),
        )
        .await?;

        Ok(application)
    }

    /// Returns every application, ordered by name.
    pub async fn list_applications(&self) -> AppResult<Vec<Application>> {
        let mut applications = self
            .storage_policy
            .call("list_applications", self.repository.list_applications())
            .await?;
        applications.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(applications)
    }

    /// Returns an application by identifier, if it exists.
    pub async fn get_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Option<Application>> {
        self.storage_policy
            .call(
                "find_application",
                self.repository.find_application(application_id),
            )
            .await
    }

    /// Activates or deactivates an application. Idempotent.
    pub async fn set_application_active(
        &self,
        application_id: ApplicationId,
        is_active: bool,
    ) -> AppResult<bool> {
        let Some(mut application) = self.get_application(application_id).await? else {
            return Ok(false);
        };

        if !application.set_active(is_active) {
            return Ok(true);
        }

        let updated = self
            .storage_policy
            .call(
                "update_application",
                self.repository.update_application(application),
            )
            .await?;

        if updated {
            info!(application_id = %application_id, is_active, "application activation changed");
            self.record_event(
                AuditAction::ApplicationActivationChanged,
                "application",
                application_id.to_string(),
                format!("is_active set to {is_active}"),
            )
            .await?;
        }

        Ok(updated)
    }

    /// Deletes an application and every role it owns.
    ///
    /// Users and invitations lose their references to the removed roles.
    pub async fn delete_application(&self, application_id: ApplicationId) -> AppResult<bool> {
        let Some(removed_roles) = self
            .storage_policy
            .call(
                "delete_application",
                self.repository.delete_application(application_id),
            )
            .await?
        else {
            return Ok(false);
        };

        info!(
            application_id = %application_id,
            removed_roles = removed_roles.len(),
            "deleted application"
        );
        self.record_event(
            AuditAction::ApplicationDeleted,
            "application",
            application_id.to_string(),
            format!("deleted application and {} role(s)", removed_roles.len()),
        )
        .await?;

        Ok(true)
    }
}
