use warden_core::AppResult;
use warden_domain::{EmailAddress, User, UserId};

use super::UserService;

impl UserService {
    /// Returns every user, ordered by email.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self
            .storage_policy
            .call("list_users", self.user_repository.list_users())
            .await?
            .into_iter()
            .map(|stored| stored.user)
            .collect();
        users.sort_by(|left, right| left.email().cmp(right.email()));

        Ok(users)
    }

    /// Returns a user by identifier, if it exists.
    pub async fn get_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .storage_policy
            .call("find_user", self.user_repository.find_user(user_id))
            .await?
            .map(|stored| stored.user))
    }

    /// Returns a user by email, compared case-insensitively.
    ///
    /// Input that is not a well-formed address cannot match anyone and
    /// yields `None`.
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let Ok(email) = EmailAddress::new(email) else {
            return Ok(None);
        };

        Ok(self
            .storage_policy
            .call(
                "find_user_by_email",
                self.user_repository.find_user_by_email(&email),
            )
            .await?
            .map(|stored| stored.user))
    }
}
