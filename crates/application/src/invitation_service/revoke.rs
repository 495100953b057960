use chrono::Utc;
use tracing::info;

use warden_core::{AppError, AppResult};
use warden_domain::{AuditAction, Invitation, InvitationId};

use super::InvitationService;

impl InvitationService {
    /// Revokes an unused invitation so its token can no longer be accepted.
    pub async fn revoke_invitation(&self, invitation_id: InvitationId) -> AppResult<Invitation> {
        let invitation = self
            .storage_policy
            .call(
                "revoke_invitation",
                self.repository.revoke_invitation(invitation_id, Utc::now()),
            )
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("invitation '{invitation_id}' does not exist"))
            })?;

        info!(invitation_id = %invitation_id, "revoked invitation");
        self.record_event(
            AuditAction::InvitationRevoked,
            invitation_id,
            "invitation revoked".to_owned(),
        )
        .await?;

        Ok(invitation)
    }

    /// Deletes unused invitations that expired more than `retention` ago.
    ///
    /// Consumed invitations are kept as the record of who accepted what.
    pub async fn purge_expired(&self, retention: chrono::Duration) -> AppResult<u64> {
        if retention < chrono::Duration::zero() {
            return Err(AppError::Validation(
                "invitation retention must not be negative".to_owned(),
            ));
        }

        let expired_before = Utc::now().checked_sub_signed(retention).ok_or_else(|| {
            AppError::Validation("invitation retention is out of range".to_owned())
        })?;
        let purged = self
            .storage_policy
            .call(
                "purge_expired_invitations",
                self.repository.purge_expired_invitations(expired_before),
            )
            .await?;

        if purged > 0 {
            info!(purged, expired_before = %expired_before, "purged expired invitations");
        }

        Ok(purged)
    }
}
