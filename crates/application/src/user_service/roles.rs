use tracing::info;

use warden_core::{AppError, AppResult};
use warden_domain::{AuditAction, RoleId, UserId};

use super::{UserMutation, UserService};

impl UserService {
    /// Adds roles to a user's role set.
    ///
    /// Already-held roles are skipped. Every role id must resolve, otherwise
    /// the call fails with `NotFound` and the user is left untouched. Returns
    /// `false` when the user does not exist.
    pub async fn assign_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<bool> {
        if !role_ids.is_empty() {
            let missing = self
                .storage_policy
                .call(
                    "find_missing_roles",
                    self.catalog_repository.find_missing_roles(role_ids),
                )
                .await?;

            if !missing.is_empty() {
                let missing = missing
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(AppError::NotFound(format!("roles not found: {missing}")));
            }
        }

        let outcome = self
            .mutate_user(user_id, |user| user.assign_roles(role_ids.iter().copied()))
            .await?;

        match outcome {
            UserMutation::Missing => Ok(false),
            UserMutation::Unchanged => Ok(true),
            UserMutation::Changed(user) => {
                info!(
                    user_id = %user_id,
                    role_count = user.role_ids().len(),
                    "assigned roles to user"
                );

                let assigned = role_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.record_user_event(
                    AuditAction::UserRolesAssigned,
                    user_id,
                    format!("assigned roles [{assigned}]"),
                )
                .await?;

                Ok(true)
            }
        }
    }

    /// Removes a role from a user.
    ///
    /// Removing a role the user does not hold succeeds without changes.
    /// Returns `false` when the user does not exist.
    pub async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let outcome = self
            .mutate_user(user_id, |user| user.remove_role(role_id))
            .await?;

        match outcome {
            UserMutation::Missing => Ok(false),
            UserMutation::Unchanged => Ok(true),
            UserMutation::Changed(_) => {
                info!(user_id = %user_id, role_id = %role_id, "removed role from user");
                self.record_user_event(
                    AuditAction::UserRoleRemoved,
                    user_id,
                    format!("removed role '{role_id}'"),
                )
                .await?;

                Ok(true)
            }
        }
    }
}
