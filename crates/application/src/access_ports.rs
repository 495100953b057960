//! Ports implemented by storage and notification adapters.

mod audit;
mod catalog;
mod invitations;
mod notifications;
mod users;

pub use audit::{AuditEvent, AuditRepository};
pub use catalog::CatalogRepository;
pub use invitations::{InvitationAcceptance, InvitationRepository};
pub use notifications::EmailService;
pub use users::{StoredUser, UserRepository, VersionedWrite};
