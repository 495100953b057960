//! Application and role catalog service.

mod applications;
mod roles;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use warden_core::AppResult;
use warden_domain::{ApplicationId, AuditAction};

use crate::access_ports::{AuditEvent, AuditRepository, CatalogRepository};
use crate::service_policy::StoragePolicy;

/// Input payload for registering an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApplicationInput {
    /// Absolute http(s) base URL.
    pub url: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Owning application.
    pub application_id: ApplicationId,
    /// Role name, unique inside the application.
    pub name: String,
    /// Raw permission grants keyed by permission name.
    pub permissions: Vec<(String, bool)>,
}

/// Application service for applications and their roles.
#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    storage_policy: StoragePolicy,
}

impl CatalogService {
    /// Creates a new catalog service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn CatalogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        storage_policy: StoragePolicy,
    ) -> Self {
        Self {
            repository,
            audit_repository,
            storage_policy,
        }
    }

    async fn record_event(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.storage_policy
            .call(
                "append_audit_event",
                self.audit_repository.append_event(AuditEvent {
                    action,
                    resource_type: resource_type.to_owned(),
                    resource_id,
                    detail: Some(detail),
                }),
            )
            .await
    }
}
