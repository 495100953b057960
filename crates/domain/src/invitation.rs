//! Invitation lifecycle.
//!
//! An invitation is `Pending` until it is consumed (`Used`), revoked
//! (`Revoked`) or outlives its expiry (`Expired`). The first two are stored
//! transitions; expiry is derived from the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::identifier::uuid_identifier;
use crate::{EmailAddress, RoleId};

uuid_identifier!(
    /// Unique identifier for an invitation.
    InvitationId
);

/// Observable invitation state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Can still be accepted.
    Pending,
    /// Consumed by an acceptance.
    Used,
    /// Withdrawn before use.
    Revoked,
    /// Past its expiry without being used.
    Expired,
}

/// Fields required to construct a new invitation.
#[derive(Debug, Clone)]
pub struct InvitationDraft {
    /// SHA-256 hex digest of the raw token.
    pub token_hash: String,
    /// Invitee email address.
    pub email: EmailAddress,
    /// Identity provider tag the invitee is expected to sign in with.
    pub identity_provider: String,
    /// Roles granted on acceptance.
    pub pre_assigned_role_ids: Vec<RoleId>,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp, strictly after `created_at`.
    pub expires_at: DateTime<Utc>,
}

/// Single-use invitation to join with a set of pre-assigned roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    id: InvitationId,
    token_hash: String,
    email: EmailAddress,
    identity_provider: NonEmptyString,
    pre_assigned_role_ids: Vec<RoleId>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Creates a validated pending invitation.
    pub fn new(draft: InvitationDraft) -> AppResult<Self> {
        if draft.expires_at <= draft.created_at {
            return Err(AppError::Validation(
                "invitation expiry must be after its creation time".to_owned(),
            ));
        }

        if draft.token_hash.trim().is_empty() {
            return Err(AppError::Validation(
                "invitation token hash must not be empty".to_owned(),
            ));
        }

        let mut pre_assigned_role_ids = Vec::with_capacity(draft.pre_assigned_role_ids.len());
        for role_id in draft.pre_assigned_role_ids {
            if !pre_assigned_role_ids.contains(&role_id) {
                pre_assigned_role_ids.push(role_id);
            }
        }

        Ok(Self {
            id: InvitationId::new(),
            token_hash: draft.token_hash,
            email: draft.email,
            identity_provider: NonEmptyString::new(draft.identity_provider)?,
            pre_assigned_role_ids,
            created_at: draft.created_at,
            expires_at: draft.expires_at,
            used_at: None,
            revoked_at: None,
        })
    }

    /// Returns the invitation identifier.
    #[must_use]
    pub fn id(&self) -> InvitationId {
        self.id
    }

    /// Returns the stored token digest.
    #[must_use]
    pub fn token_hash(&self) -> &str {
        self.token_hash.as_str()
    }

    /// Returns the invitee email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the identity provider tag.
    #[must_use]
    pub fn identity_provider(&self) -> &NonEmptyString {
        &self.identity_provider
    }

    /// Returns roles granted on acceptance, in issue order.
    #[must_use]
    pub fn pre_assigned_role_ids(&self) -> &[RoleId] {
        &self.pre_assigned_role_ids
    }

    /// Returns the issue timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the expiry timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the consumption timestamp, if consumed.
    #[must_use]
    pub fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    /// Returns the revocation timestamp, if revoked.
    #[must_use]
    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    /// Returns whether the invitation has been consumed.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Returns the state observed at `now`.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.used_at.is_some() {
            InvitationStatus::Used
        } else if self.revoked_at.is_some() {
            InvitationStatus::Revoked
        } else if now > self.expires_at {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }

    /// Marks the invitation consumed at `used_at`.
    ///
    /// Fails unless the invitation is pending at that instant, so storage
    /// adapters can use it as the compare step of a compare-and-set.
    pub fn consume(&mut self, used_at: DateTime<Utc>) -> AppResult<()> {
        self.ensure_pending(used_at)?;
        self.used_at = Some(used_at);
        Ok(())
    }

    /// Fails with the error matching the state observed at `now` unless the
    /// invitation is still pending.
    pub fn ensure_pending(&self, now: DateTime<Utc>) -> AppResult<()> {
        match self.status_at(now) {
            InvitationStatus::Pending => Ok(()),
            InvitationStatus::Used => Err(AppError::AlreadyUsed(format!(
                "invitation '{}' has already been used",
                self.id
            ))),
            InvitationStatus::Revoked => Err(AppError::Conflict(format!(
                "invitation '{}' has been revoked",
                self.id
            ))),
            InvitationStatus::Expired => Err(AppError::Expired(format!(
                "invitation '{}' expired at {}",
                self.id,
                self.expires_at.to_rfc3339()
            ))),
        }
    }

    /// Marks an unused invitation permanently unusable.
    pub fn revoke(&mut self, revoked_at: DateTime<Utc>) -> AppResult<()> {
        if self.used_at.is_some() {
            return Err(AppError::AlreadyUsed(format!(
                "invitation '{}' has already been used",
                self.id
            )));
        }

        if self.revoked_at.is_some() {
            return Err(AppError::Conflict(format!(
                "invitation '{}' has already been revoked",
                self.id
            )));
        }

        self.revoked_at = Some(revoked_at);
        Ok(())
    }

    /// Drops references to deleted roles. Returns `true` when the list changed.
    pub fn remove_roles(&mut self, role_ids: &[RoleId]) -> bool {
        let before = self.pre_assigned_role_ids.len();
        self.pre_assigned_role_ids
            .retain(|role_id| !role_ids.contains(role_id));
        self.pre_assigned_role_ids.len() != before
    }
}
