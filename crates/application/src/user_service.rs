//! User management service.
//!
//! Role-set and flag mutations are read-modify-write cycles guarded by the
//! stored user version; a stale write is retried from a fresh read so that
//! concurrent callers never lose each other's updates. Mutations report a
//! missing user as `Ok(false)` and reserve errors for invalid input and
//! storage faults.

mod flags;
mod lifecycle;
mod retrieval;
mod roles;


use std::sync::Arc;

use tracing::debug;

use warden_core::{AppError, AppResult};
use warden_domain::{AuditAction, User, UserId};

use crate::access_ports::{
    AuditEvent, AuditRepository, CatalogRepository, UserRepository, VersionedWrite,
};
use crate::service_policy::StoragePolicy;

/// Result of one guarded user mutation.
#[derive(Debug)]
enum UserMutation {
    /// The user does not exist.
    Missing,
    /// The mutation was a no-op for the current state.
    Unchanged,
    /// The mutation was persisted.
    Changed(User),
}

/// Application service for user queries, role assignment and account flags.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    catalog_repository: Arc<dyn CatalogRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    storage_policy: StoragePolicy,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        catalog_repository: Arc<dyn CatalogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        storage_policy: StoragePolicy,
    ) -> Self {
        Self {
            user_repository,
            catalog_repository,
            audit_repository,
            storage_policy,
        }
    }

    /// Applies `mutate` to the latest stored user, retrying on stale versions.
    ///
    /// `mutate` returns whether it changed anything; unchanged users are not
    /// written back.
    async fn mutate_user<F>(&self, user_id: UserId, mutate: F) -> AppResult<UserMutation>
    where
        F: Fn(&mut User) -> bool + Send + Sync,
    {
        let max_attempts = self.storage_policy.max_write_attempts();

        for attempt in 1..=max_attempts {
            let Some(stored) = self
                .storage_policy
                .call("find_user", self.user_repository.find_user(user_id))
                .await?
            else {
                return Ok(UserMutation::Missing);
            };

            let mut user = stored.user;
            if !mutate(&mut user) {
                return Ok(UserMutation::Unchanged);
            }

            let write = self
                .storage_policy
                .call(
                    "update_user",
                    self.user_repository.update_user(user.clone(), stored.version),
                )
                .await?;

            match write {
                VersionedWrite::Applied { .. } => return Ok(UserMutation::Changed(user)),
                VersionedWrite::Missing => return Ok(UserMutation::Missing),
                VersionedWrite::Stale => {
                    debug!(
                        user_id = %user_id,
                        attempt,
                        max_attempts,
                        "user version changed during write, retrying"
                    );
                }
            }
        }

        Err(AppError::Conflict(format!(
            "user '{user_id}' was modified concurrently; gave up after {max_attempts} attempts"
        )))
    }

    async fn record_user_event(
        &self,
        action: AuditAction,
        user_id: UserId,
        detail: String,
    ) -> AppResult<()> {
        self.storage_policy
            .call(
                "append_audit_event",
                self.audit_repository.append_event(AuditEvent {
                    action,
                    resource_type: "user".to_owned(),
                    resource_id: user_id.to_string(),
                    detail: Some(detail),
                }),
            )
            .await
    }
}
