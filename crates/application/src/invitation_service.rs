//! Invitation issuance and single-use acceptance.
//!
//! Raw tokens are 256-bit random values rendered as hex. Only their SHA-256
//! digest is persisted, so the issuer is the only party that ever sees the
//! token itself.

mod accept;
mod issue;
mod revoke;
mod token_crypto;


use std::sync::Arc;

use warden_core::AppResult;
use warden_domain::{AuditAction, Invitation, InvitationId, RoleId, User};

use crate::access_ports::{
    AuditEvent, AuditRepository, CatalogRepository, EmailService, InvitationRepository,
};
use crate::service_policy::{InvitationPolicy, StoragePolicy};

/// Input payload for issuing an invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInvitationInput {
    /// Invitee email address.
    pub email: String,
    /// Identity provider the invitee is expected to sign in with.
    pub identity_provider: String,
    /// Roles granted on acceptance.
    pub pre_assigned_role_ids: Option<Vec<RoleId>>,
    /// Whether the invitee should be notified by email.
    pub send_email: bool,
}

/// Freshly issued invitation together with its raw token.
#[derive(Debug, Clone)]
pub struct IssuedInvitation {
    /// Stored invitation.
    pub invitation: Invitation,
    /// Raw token. Not recoverable after this call returns.
    pub token: String,
    /// Whether a notification email was delivered.
    pub notified: bool,
}

/// Outcome of a successful acceptance.
#[derive(Debug, Clone)]
pub struct AcceptedInvitation {
    /// Consumed invitation.
    pub invitation: Invitation,
    /// User holding the pre-assigned roles.
    pub user: User,
    /// Whether the user was created by this acceptance.
    pub user_created: bool,
}

/// Application service for the invitation lifecycle.
#[derive(Clone)]
pub struct InvitationService {
    repository: Arc<dyn InvitationRepository>,
    catalog_repository: Arc<dyn CatalogRepository>,
    email_service: Arc<dyn EmailService>,
    audit_repository: Arc<dyn AuditRepository>,
    policy: InvitationPolicy,
    storage_policy: StoragePolicy,
}

impl InvitationService {
    /// Creates a new invitation service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn InvitationRepository>,
        catalog_repository: Arc<dyn CatalogRepository>,
        email_service: Arc<dyn EmailService>,
        audit_repository: Arc<dyn AuditRepository>,
        policy: InvitationPolicy,
        storage_policy: StoragePolicy,
    ) -> Self {
        Self {
            repository,
            catalog_repository,
            email_service,
            audit_repository,
            policy,
            storage_policy,
        }
    }

    /// Returns an invitation by identifier, if it exists.
    pub async fn get_invitation(
        &self,
        invitation_id: InvitationId,
    ) -> AppResult<Option<Invitation>> {
        self.storage_policy
            .call(
                "find_invitation",
                self.repository.find_invitation(invitation_id),
            )
            .await
    }

    /// Returns every stored invitation, oldest first.
    pub async fn list_invitations(&self) -> AppResult<Vec<Invitation>> {
        let mut invitations = self
            .storage_policy
            .call("list_invitations", self.repository.list_invitations())
            .await?;
        invitations.sort_by_key(Invitation::created_at);
        Ok(invitations)
    }

    async fn missing_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleId>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.storage_policy
            .call(
                "find_missing_roles",
                self.catalog_repository.find_missing_roles(role_ids),
            )
            .await
    }

    async fn record_event(
        &self,
        action: AuditAction,
        invitation_id: InvitationId,
        detail: String,
    ) -> AppResult<()> {
        self.append_event(action, "invitation", invitation_id.to_string(), detail)
            .await
    }

    async fn append_event(
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

fn join_role_ids(role_ids: &[RoleId]) -> String {
    role_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
