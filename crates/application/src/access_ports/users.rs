use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::{EmailAddress, User, UserId};

/// User snapshot paired with its storage version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    /// Persisted user state.
    pub user: User,
    /// Monotonic version bumped by every successful write.
    pub version: u64,
}

/// Outcome of a version-checked user write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionedWrite {
    /// The write was applied; carries the new version.
    Applied {
        /// Version assigned to the written state.
        version: u64,
    },
    /// Another writer got there first; re-read and retry.
    Stale,
    /// The user no longer exists.
    Missing,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns a consistent snapshot of every user.
    async fn list_users(&self) -> AppResult<Vec<StoredUser>>;

    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<StoredUser>>;

    /// Finds a user by canonical email.
    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<StoredUser>>;

    /// Inserts a new user. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: User) -> AppResult<StoredUser>;

    /// Replaces a user only if its stored version still equals
    /// `expected_version`.
    ///
    /// Every role held by `user` must still exist when the write is applied;
    /// otherwise the call fails with `NotFound` and nothing is written.
    async fn update_user(&self, user: User, expected_version: u64) -> AppResult<VersionedWrite>;

    /// Hard-deletes a user. Returns `false` when it did not exist.
    async fn delete_user(&self, user_id: UserId) -> AppResult<bool>;
}
