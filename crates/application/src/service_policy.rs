//! Tunables shared by the access services.

use std::future::Future;
use std::time::Duration;

use warden_core::{AppError, AppResult};

/// Bounds applied to every storage collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoragePolicy {
    call_timeout: Duration,
    max_write_attempts: u32,
}

impl StoragePolicy {
    /// Default per-call storage timeout.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

    /// Default number of optimistic write attempts before giving up.
    pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;

    /// Creates a validated storage policy.
    pub fn new(call_timeout: Duration, max_write_attempts: u32) -> AppResult<Self> {
        if call_timeout.is_zero() {
            return Err(AppError::Validation(
                "storage call timeout must be greater than zero".to_owned(),
            ));
        }

        if max_write_attempts == 0 {
            return Err(AppError::Validation(
                "storage write attempts must be at least one".to_owned(),
            ));
        }

        Ok(Self {
            call_timeout,
            max_write_attempts,
        })
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Returns the optimistic write attempt budget.
    #[must_use]
    pub fn max_write_attempts(&self) -> u32 {
        self.max_write_attempts
    }

    /// Runs one storage call under the configured timeout.
    ///
    /// An elapsed timeout surfaces as [`AppError::StorageFault`].
    pub async fn call<T, F>(&self, operation: &'static str, future: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(AppError::StorageFault(format!(
                "{operation} timed out after {}ms",
                self.call_timeout.as_millis()
            ))),
        }
    }
}

impl Default for StoragePolicy {
    fn default() -> Self {
        Self {
            call_timeout: Self::DEFAULT_CALL_TIMEOUT,
            max_write_attempts: Self::DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

/// Invitation issuance settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationPolicy {
    ttl: chrono::Duration,
    accept_url: String,
}

impl InvitationPolicy {
    /// Longest invitation lifetime accepted by [`InvitationPolicy::new`].
    pub const MAX_TTL_DAYS: i64 = 365;

    /// Creates a validated invitation policy.
    pub fn new(ttl: chrono::Duration, accept_url: impl Into<String>) -> AppResult<Self> {
        if ttl <= chrono::Duration::zero() {
            return Err(AppError::Validation(
                "invitation ttl must be greater than zero".to_owned(),
            ));
        }

        if ttl > chrono::Duration::days(Self::MAX_TTL_DAYS) {
            return Err(AppError::Validation(format!(
                "invitation ttl must not exceed {} days",
                Self::MAX_TTL_DAYS
            )));
        }

        let accept_url = accept_url.into().trim().trim_end_matches('/').to_owned();
        if accept_url.is_empty() {
            return Err(AppError::Validation(
                "invitation accept url must not be empty".to_owned(),
            ));
        }

        Ok(Self { ttl, accept_url })
    }

    /// Returns how long a new invitation stays valid.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Builds the link sent to the invitee.
    #[must_use]
    pub fn accept_link(&self, raw_token: &str) -> String {
        format!("{}?token={raw_token}", self.accept_url)
    }
}

impl Default for InvitationPolicy {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::days(7),
            accept_url: "http://localhost:3000/accept-invite".to_owned(),
        }
    }
}
