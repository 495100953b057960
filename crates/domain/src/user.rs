//! User domain types and validation rules.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

use crate::RoleId;
use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a user record.
    UserId
);

/// Maximum accepted email length (RFC 5321 path limit).
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Validated email address, stored in canonical lower-case form.
///
/// Equality on this type is therefore case-insensitive with respect to the
/// raw input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty()
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(AppError::Validation(
                "email domain must contain at least one inner '.'".to_owned(),
            ));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "email address must not contain whitespace".to_owned(),
            ));
        }

        if trimmed.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "email address must not exceed {EMAIL_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Account holder with role references and trust flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    role_ids: BTreeSet<RoleId>,
    is_active: bool,
    can_impersonate: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// Creates an active user without roles or impersonation rights.
    #[must_use]
    pub fn new(email: EmailAddress, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email,
            role_ids: BTreeSet::new(),
            is_active: true,
            can_impersonate: false,
            created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the canonical email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns assigned role identifiers in stable order.
    #[must_use]
    pub fn role_ids(&self) -> &BTreeSet<RoleId> {
        &self.role_ids
    }

    /// Returns whether the role is currently held.
    #[must_use]
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the account may impersonate other users.
    #[must_use]
    pub fn can_impersonate(&self) -> bool {
        self.can_impersonate
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Adds roles that are not yet held. Returns `true` when the set changed.
    pub fn assign_roles(&mut self, role_ids: impl IntoIterator<Item = RoleId>) -> bool {
        let before = self.role_ids.len();
        self.role_ids.extend(role_ids);
        self.role_ids.len() != before
    }

    /// Removes a role if held. Returns `true` when the set changed.
    pub fn remove_role(&mut self, role_id: RoleId) -> bool {
        self.role_ids.remove(&role_id)
    }

    /// Removes every listed role. Returns `true` when the set changed.
    pub fn remove_roles(&mut self, role_ids: &[RoleId]) -> bool {
        let before = self.role_ids.len();
        self.role_ids.retain(|role_id| !role_ids.contains(role_id));
        self.role_ids.len() != before
    }

    /// Sets the activation flag. Returns `true` when the value changed.
    pub fn set_active(&mut self, is_active: bool) -> bool {
        let changed = self.is_active != is_active;
        self.is_active = is_active;
        changed
    }

    /// Sets the impersonation flag. Returns `true` when the value changed.
    pub fn set_can_impersonate(&mut self, can_impersonate: bool) -> bool {
        let changed = self.can_impersonate != can_impersonate;
        self.can_impersonate = can_impersonate;
        changed
    }
}
