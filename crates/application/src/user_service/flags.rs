use tracing::{info, warn};

use warden_core::AppResult;
use warden_domain::{AuditAction, UserId};

use super::{UserMutation, UserService};

impl UserService {
    /// Activates or deactivates a user. Setting the current value is a no-op.
    pub async fn set_active(&self, user_id: UserId, is_active: bool) -> AppResult<bool> {
        let outcome = self
            .mutate_user(user_id, |user| user.set_active(is_active))
            .await?;

        match outcome {
            UserMutation::Missing => Ok(false),
            UserMutation::Unchanged => Ok(true),
            UserMutation::Changed(_) => {
                info!(user_id = %user_id, is_active, "user activation changed");
                self.record_user_event(
                    AuditAction::UserActivationChanged,
                    user_id,
                    format!("is_active set to {is_active}"),
                )
                .await?;

                Ok(true)
            }
        }
    }

    /// Grants or withdraws impersonation rights.
    ///
    /// Independent of activation and audited under its own action.
    pub async fn set_can_impersonate(
        &self,
        user_id: UserId,
        can_impersonate: bool,
    ) -> AppResult<bool> {
        let outcome = self
            .mutate_user(user_id, |user| user.set_can_impersonate(can_impersonate))
            .await?;

        match outcome {
            UserMutation::Missing => Ok(false),
            UserMutation::Unchanged => Ok(true),
            UserMutation::Changed(_) => {
                warn!(
                    user_id = %user_id,
                    can_impersonate,
                    "user impersonation capability changed"
                );
                self.record_user_event(
                    AuditAction::UserImpersonationChanged,
                    user_id,
                    format!("can_impersonate set to {can_impersonate}"),
                )
                .await?;

                Ok(true)
            }
        }
    }
}
