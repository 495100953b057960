//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod identifier;

mod application;
mod audit;
mod invitation;
mod role;
mod user;

pub use application::{Application, ApplicationId};
pub use audit::AuditAction;
pub use invitation::{Invitation, InvitationDraft, InvitationId, InvitationStatus};
pub use role::{
    PERMISSION_NAME_MAX_LENGTH, PermissionGrants, PermissionName, Role, RoleId,
    parse_permission_grants,
};
pub use user::{EMAIL_MAX_LENGTH, EmailAddress, User, UserId};
