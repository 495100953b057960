use chrono::Utc;
use tracing::info;

use warden_core::{AppError, AppResult};
use warden_domain::{AuditAction, EmailAddress, User, UserId};

use super::UserService;

impl UserService {
    /// Creates an active user for a new email address.
    pub async fn create_user(&self, email: &str) -> AppResult<User> {
        let email = EmailAddress::new(email)?;

        let existing = self
            .storage_policy
            .call(
                "find_user_by_email",
                self.user_repository.find_user_by_email(&email),
            )
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "a user with email '{email}' already exists"
            )));
        }

        self.insert_user(email).await
    }

    /// Hard-deletes a user and its role associations.
    ///
    /// Roles and applications are never touched. Returns `false` when the
    /// user does not exist.
    pub async fn delete(&self, user_id: UserId) -> AppResult<bool> {
        let deleted = self
            .storage_policy
            .call("delete_user", self.user_repository.delete_user(user_id))
            .await?;

        if deleted {
            info!(user_id = %user_id, "deleted user");
            self.record_user_event(AuditAction::UserDeleted, user_id, "user deleted".to_owned())
                .await?;
        }

        Ok(deleted)
    }

    async fn insert_user(&self, email: EmailAddress) -> AppResult<User> {
        let stored = self
            .storage_policy
            .call(
                "create_user",
                self.user_repository.create_user(User::new(email, Utc::now())),
            )
            .await?;

        info!(user_id = %stored.user.id(), "created user");
        self.record_user_event(
            AuditAction::UserCreated,
            stored.user.id(),
            format!("created user '{}'", stored.user.email()),
        )
        .await?;

        Ok(stored.user)
    }
}
