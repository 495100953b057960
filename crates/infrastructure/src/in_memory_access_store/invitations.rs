use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_application::{InvitationAcceptance, InvitationRepository, StoredUser};
use warden_core::{AppError, AppResult};
use warden_domain::{Invitation, InvitationId, User};

use super::{InMemoryAccessStore, roles_not_found};

#[async_trait]
impl InvitationRepository for InMemoryAccessStore {
    async fn create_invitation(&self, invitation: Invitation) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state
            .invitation_ids_by_token_hash
            .contains_key(invitation.token_hash())
        {
            return Err(AppError::Conflict(
                "an invitation with this token already exists".to_owned(),
            ));
        }

        state
            .invitation_ids_by_token_hash
            .insert(invitation.token_hash().to_owned(), invitation.id());
        state.invitations.insert(invitation.id(), invitation);
        Ok(())
    }

    async fn find_invitation(
        &self,
        invitation_id: InvitationId,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .state
            .read()
            .await
            .invitations
            .get(&invitation_id)
            .cloned())
    }

    async fn find_invitation_by_token_hash(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<Invitation>> {
        let state = self.state.read().await;
        Ok(state
            .invitation_ids_by_token_hash
            .get(token_hash)
            .and_then(|invitation_id| state.invitations.get(invitation_id))
            .cloned())
    }

    async fn list_invitations(&self) -> AppResult<Vec<Invitation>> {
        Ok(self
            .state
            .read()
            .await
            .invitations
            .values()
            .cloned()
            .collect())
    }

    async fn accept_invitation(
        &self,
        token_hash: &str,
        accepted_at: DateTime<Utc>,
    ) -> AppResult<Option<InvitationAcceptance>> {
        let mut state = self.state.write().await;
        let Some(mut invitation) = state
            .invitation_ids_by_token_hash
            .get(token_hash)
            .and_then(|invitation_id| state.invitations.get(invitation_id))
            .cloned()
        else {
            return Ok(None);
        };

        // Everything below works on copies until the final commit.
        invitation.consume(accepted_at)?;

        let missing = state.missing_roles(invitation.pre_assigned_role_ids());
        if !missing.is_empty() {
            return Err(roles_not_found(&missing));
        }

        let existing = state
            .user_ids_by_email
            .get(invitation.email())
            .and_then(|user_id| state.users.get(user_id))
            .cloned();
        let user_created = existing.is_none();
        let mut stored = existing.unwrap_or_else(|| StoredUser {
            user: User::new(invitation.email().clone(), accepted_at),
            version: 0,
        });
        let roles_changed = stored
            .user
            .assign_roles(invitation.pre_assigned_role_ids().iter().copied());
        if user_created || roles_changed {
            stored.version += 1;
        }

        state
            .user_ids_by_email
            .insert(stored.user.email().clone(), stored.user.id());
        state.users.insert(stored.user.id(), stored.clone());
        state.invitations.insert(invitation.id(), invitation.clone());

        Ok(Some(InvitationAcceptance {
            invitation,
            user: stored,
            user_created,
        }))
    }

    async fn revoke_invitation(
        &self,
        invitation_id: InvitationId,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>> {
        let mut state = self.state.write().await;
        let Some(invitation) = state.invitations.get_mut(&invitation_id) else {
            return Ok(None);
        };

        invitation.revoke(revoked_at)?;
        Ok(Some(invitation.clone()))
    }

    async fn purge_expired_invitations(&self, expired_before: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;

        let purged: Vec<(InvitationId, String)> = state
            .invitations
            .values()
            .filter(|invitation| !invitation.is_used() && invitation.expires_at() < expired_before)
            .map(|invitation| (invitation.id(), invitation.token_hash().to_owned()))
            .collect();

        for (invitation_id, token_hash) in &purged {
            state.invitations.remove(invitation_id);
            state.invitation_ids_by_token_hash.remove(token_hash);
        }

        u64::try_from(purged.len())
            .map_err(|error| AppError::Internal(format!("purge count overflow: {error}")))
    }
}
