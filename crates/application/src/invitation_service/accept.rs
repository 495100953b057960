use chrono::Utc;
use tracing::{info, warn};

use warden_core::{AppError, AppResult};
use warden_domain::{AuditAction, Invitation, User};

use super::token_crypto::hash_token;
use super::{AcceptedInvitation, InvitationService, join_role_ids};
use crate::access_ports::InvitationAcceptance;

impl InvitationService {
    /// Consumes an invitation token and provisions the invitee.
    ///
    /// The user is found or created by email and receives every pre-assigned
    /// role. Storage applies the consumption and the provisioning together,
    /// so a failed or cancelled call leaves the token acceptable. Exactly one
    /// of several concurrent acceptances of the same token succeeds; the
    /// others fail with `AlreadyUsed`.
    pub async fn accept_invitation(&self, raw_token: &str) -> AppResult<AcceptedInvitation> {
        let raw_token = raw_token.trim();
        if raw_token.is_empty() {
            return Err(AppError::NotFound("invitation token not found".to_owned()));
        }

        let token_hash = hash_token(raw_token);
        let InvitationAcceptance {
            invitation,
            user,
            user_created,
        } = self
            .storage_policy
            .call(
                "accept_invitation",
                self.repository.accept_invitation(&token_hash, Utc::now()),
            )
            .await?
            .ok_or_else(|| AppError::NotFound("invitation token not found".to_owned()))?;
        let user = user.user;

        info!(
            invitation_id = %invitation.id(),
            user_id = %user.id(),
            user_created,
            "accepted invitation"
        );

        // The acceptance is committed; audit failures are logged only.
        if let Err(error) = self.record_acceptance(&invitation, &user, user_created).await {
            warn!(
                invitation_id = %invitation.id(),
                error = %error,
                "failed to record invitation acceptance audit events"
            );
        }

        Ok(AcceptedInvitation {
            invitation,
            user,
            user_created,
        })
    }

    /// Looks up the invitation behind a raw token without changing it.
    pub async fn inspect_token(&self, raw_token: &str) -> AppResult<Option<Invitation>> {
        let raw_token = raw_token.trim();
        if raw_token.is_empty() {
            return Ok(None);
        }

        let token_hash = hash_token(raw_token);
        self.storage_policy
            .call(
                "find_invitation_by_token_hash",
                self.repository.find_invitation_by_token_hash(&token_hash),
            )
            .await
    }

    async fn record_acceptance(
        &self,
        invitation: &Invitation,
        user: &User,
        user_created: bool,
    ) -> AppResult<()> {
        if user_created {
            self.append_event(
                AuditAction::UserCreated,
                "user",
                user.id().to_string(),
                format!("created user '{}' from invitation", user.email()),
            )
            .await?;
        }

        if !invitation.pre_assigned_role_ids().is_empty() {
            self.append_event(
                AuditAction::UserRolesAssigned,
                "user",
                user.id().to_string(),
                format!(
                    "assigned roles [{}] from invitation",
                    join_role_ids(invitation.pre_assigned_role_ids())
                ),
            )
            .await?;
        }

        self.record_event(
            AuditAction::InvitationAccepted,
            invitation.id(),
            format!("accepted by user '{}'", user.id()),
        )
        .await
    }
}
