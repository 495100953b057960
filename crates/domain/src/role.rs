use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::ApplicationId;
use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a role.
    RoleId
);

/// Maximum accepted permission name length.
pub const PERMISSION_NAME_MAX_LENGTH: usize = 128;

/// Validated permission key, e.g. `invoices.read` or `billing:export`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Creates a validated permission name.
    ///
    /// Names are trimmed and may contain ASCII alphanumerics plus `.`, `_`,
    /// `:` and `-`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "permission name must not be empty".to_owned(),
            ));
        }

        if trimmed.len() > PERMISSION_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission name must not exceed {PERMISSION_NAME_MAX_LENGTH} characters"
            )));
        }

        if let Some(invalid) = trimmed
            .chars()
            .find(|character| !(character.is_ascii_alphanumeric() || ".:_-".contains(*character)))
        {
            return Err(AppError::Validation(format!(
                "permission name '{trimmed}' contains invalid character '{invalid}'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the permission name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PermissionName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.0
    }
}

/// Permission grants keyed by name.
pub type PermissionGrants = BTreeMap<PermissionName, bool>;

/// Validates raw permission keys into a grant map.
///
/// Keys that normalise to the same name are rejected rather than merged.
pub fn parse_permission_grants(
    permissions: impl IntoIterator<Item = (String, bool)>,
) -> AppResult<PermissionGrants> {
    let mut grants = PermissionGrants::new();
    for (name, granted) in permissions {
        let name = PermissionName::new(name)?;
        if grants.contains_key(&name) {
            return Err(AppError::Validation(format!(
                "duplicate permission name '{}'",
                name.as_str()
            )));
        }
        grants.insert(name, granted);
    }

    Ok(grants)
}

/// Named permission bundle owned by an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    application_id: ApplicationId,
    name: NonEmptyString,
    permissions: PermissionGrants,
}

impl Role {
    /// Creates a validated role for the owning application.
    pub fn new(
        application_id: ApplicationId,
        name: impl Into<String>,
        permissions: PermissionGrants,
    ) -> AppResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            application_id,
            name: NonEmptyString::new(name)?,
            permissions,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the owning application identifier.
    #[must_use]
    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns whether `other` names this role within the same application.
    #[must_use]
    pub fn has_name(&self, other: &str) -> bool {
        self.name.as_str().eq_ignore_ascii_case(other.trim())
    }

    /// Returns the permission grants.
    #[must_use]
    pub fn permissions(&self) -> &PermissionGrants {
        &self.permissions
    }

    /// Returns whether the named permission is explicitly granted.
    #[must_use]
    pub fn grants(&self, permission: &str) -> bool {
        PermissionName::new(permission)
            .ok()
            .and_then(|name| self.permissions.get(&name).copied())
            .unwrap_or(false)
    }

    /// Replaces the permission grants.
    pub fn replace_permissions(&mut self, permissions: PermissionGrants) {
        self.permissions = permissions;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn permission_names_reject_whitespace_and_symbols() {
        assert!(PermissionName::new("").is_err());
        assert!(PermissionName::new("invoices read").is_err());
        assert!(PermissionName::new("invoices/read").is_err());
        assert!(PermissionName::new("invoices.read").is_ok());
        assert!(PermissionName::new("billing:export-v2").is_ok());
    }

    #[test]
    fn duplicate_keys_after_trimming_are_rejected() {
        let result = parse_permission_grants([
            ("invoices.read".to_owned(), true),
            (" invoices.read ".to_owned(), false),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn role_grants_reflect_mapping() {
        let grants = parse_permission_grants([
            ("invoices.read".to_owned(), true),
            ("invoices.write".to_owned(), false),
        ])
        .unwrap_or_else(|_| unreachable!());
        let role = Role::new(ApplicationId::new(), "Accountant", grants)
            .unwrap_or_else(|_| unreachable!());

        assert!(role.grants("invoices.read"));
        assert!(!role.grants("invoices.write"));
        assert!(!role.grants("payroll.read"));
        assert!(role.has_name(" accountant"));
    }

    #[test]
    fn permissions_serialize_as_flat_map() {
        let grants = parse_permission_grants([("reports.view".to_owned(), true)])
            .unwrap_or_else(|_| unreachable!());
        let value = serde_json::to_value(&grants).unwrap_or_default();
        assert_eq!(value, serde_json::json!({"reports.view": true}));
    }

    proptest! {
        #[test]
        fn well_formed_names_are_accepted(name in "[a-z][a-z0-9_.:-]{0,40}") {
            prop_assert!(PermissionName::new(name).is_ok());
        }
    }
}
