//! Application services and ports for user, role, application and
//! invitation management.

#![forbid(unsafe_code)]

mod access_ports;
mod catalog_service;
mod invitation_service;
mod service_policy;
mod user_service;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    AuditEvent, AuditRepository, CatalogRepository, EmailService, InvitationAcceptance,
    InvitationRepository, StoredUser, UserRepository, VersionedWrite,
};
pub use catalog_service::{CatalogService, CreateApplicationInput, CreateRoleInput};
pub use invitation_service::{
    AcceptedInvitation, CreateInvitationInput, InvitationService, IssuedInvitation,
};
pub use service_policy::{InvitationPolicy, StoragePolicy};
pub use user_service::UserService;
