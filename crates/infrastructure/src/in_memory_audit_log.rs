//! Append-only in-memory audit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use warden_application::{AuditEvent, AuditRepository};
use warden_core::AppResult;

/// Audit event stamped with the time it was appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Append timestamp.
    pub recorded_at: DateTime<Utc>,
    /// Recorded event.
    pub event: AuditEvent,
}

/// In-memory audit repository that also mirrors events to tracing output.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryAuditLog {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every entry in append order.
    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditLog {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            action = event.action.as_str(),
            resource_type = event.resource_type.as_str(),
            resource_id = event.resource_id.as_str(),
            detail = event.detail.as_deref().unwrap_or_default(),
            "audit"
        );

        self.entries.write().await.push(AuditLogEntry {
            recorded_at: Utc::now(),
            event,
        });
        Ok(())
    }
}
