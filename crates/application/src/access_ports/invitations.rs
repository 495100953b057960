use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_core::AppResult;
use warden_domain::{Invitation, InvitationId};

use super::StoredUser;

/// State written by one successful invitation acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationAcceptance {
    /// Invitation with `used_at` set.
    pub invitation: Invitation,
    /// Invitee after the pre-assigned roles were added.
    pub user: StoredUser,
    /// Whether the invitee account was created by this acceptance.
    pub user_created: bool,
}

/// Repository port for invitation persistence.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Stores a new invitation.
    async fn create_invitation(&self, invitation: Invitation) -> AppResult<()>;

    /// Finds an invitation by identifier.
    async fn find_invitation(&self, invitation_id: InvitationId)
    -> AppResult<Option<Invitation>>;

    /// Finds an invitation by the SHA-256 digest of its token.
    async fn find_invitation_by_token_hash(&self, token_hash: &str)
    -> AppResult<Option<Invitation>>;

    /// Lists every stored invitation.
    async fn list_invitations(&self) -> AppResult<Vec<Invitation>>;

    /// Atomically accepts a pending invitation and provisions its invitee.
    ///
    /// One critical section covers the whole acceptance: the pending check
    /// and the write of `used_at`, finding or creating the user that owns the
    /// invitation email, and adding every pre-assigned role to that user.
    /// When the invitation is not pending the domain error from
    /// [`Invitation::consume`] is returned; when a pre-assigned role no
    /// longer exists the call fails with `NotFound`. Either way nothing is
    /// written. Returns `None` for an unknown token.
    async fn accept_invitation(
        &self,
        token_hash: &str,
        accepted_at: DateTime<Utc>,
    ) -> AppResult<Option<InvitationAcceptance>>;

    /// Atomically revokes an unused invitation.
    ///
    /// Fails with the domain error from [`Invitation::revoke`] without
    /// writing anything when the invitation is already used or revoked.
    /// Returns `None` for an unknown identifier.
    async fn revoke_invitation(
        &self,
        invitation_id: InvitationId,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>>;

    /// Deletes unused invitations that expired before `expired_before`.
    async fn purge_expired_invitations(&self, expired_before: DateTime<Utc>) -> AppResult<u64>;
}
