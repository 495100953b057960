use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a user account is created.
    UserCreated,
    /// Emitted when roles are added to a user.
    UserRolesAssigned,
    /// Emitted when a role is removed from a user.
    UserRoleRemoved,
    /// Emitted when a user is activated or deactivated.
    UserActivationChanged,
    /// Emitted when impersonation rights are granted or withdrawn.
    UserImpersonationChanged,
    /// Emitted when a user is deleted.
    UserDeleted,
    /// Emitted when an application is registered.
    ApplicationCreated,
    /// Emitted when an application is activated or deactivated.
    ApplicationActivationChanged,
    /// Emitted when an application and its roles are deleted.
    ApplicationDeleted,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when role permissions are replaced.
    RolePermissionsChanged,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when an invitation is issued.
    InvitationCreated,
    /// Emitted when an invitation is accepted.
    InvitationAccepted,
    /// Emitted when an invitation is revoked.
    InvitationRevoked,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserCreated => "user.created",
            Self::UserRolesAssigned => "user.roles.assigned",
            Self::UserRoleRemoved => "user.role.removed",
            Self::UserActivationChanged => "user.activation.changed",
            Self::UserImpersonationChanged => "user.impersonation.changed",
            Self::UserDeleted => "user.deleted",
            Self::ApplicationCreated => "application.created",
            Self::ApplicationActivationChanged => "application.activation.changed",
            Self::ApplicationDeleted => "application.deleted",
            Self::RoleCreated => "role.created",
            Self::RolePermissionsChanged => "role.permissions.changed",
            Self::RoleDeleted => "role.deleted",
            Self::InvitationCreated => "invitation.created",
            Self::InvitationAccepted => "invitation.accepted",
            Self::InvitationRevoked => "invitation.revoked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuditAction;

    #[test]
    fn activation_and_impersonation_are_audited_separately() {
        assert_ne!(
            AuditAction::UserActivationChanged.as_str(),
            AuditAction::UserImpersonationChanged.as_str()
        );
    }
}
