//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_email_service;
mod in_memory_access_store;
mod in_memory_audit_log;
mod smtp_email_service;

pub use console_email_service::ConsoleEmailService;
pub use in_memory_access_store::InMemoryAccessStore;
pub use in_memory_audit_log::{AuditLogEntry, InMemoryAuditLog};
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
