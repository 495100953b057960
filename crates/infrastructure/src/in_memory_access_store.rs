//! In-memory implementation of the user, catalog and invitation ports.
//!
//! All state lives behind one lock so that cascades (role deletion touching
//! users and invitations) and compare-and-set transitions are atomic.

mod catalog;
mod invitations;
mod users;


use std::collections::HashMap;

use tokio::sync::RwLock;

use warden_application::StoredUser;
use warden_core::AppError;
use warden_domain::{
    Application, ApplicationId, EmailAddress, Invitation, InvitationId, Role, RoleId, UserId,
};

#[derive(Debug, Default)]
struct AccessState {
    users: HashMap<UserId, StoredUser>,
    user_ids_by_email: HashMap<EmailAddress, UserId>,
    applications: HashMap<ApplicationId, Application>,
    roles: HashMap<RoleId, Role>,
    invitations: HashMap<InvitationId, Invitation>,
    invitation_ids_by_token_hash: HashMap<String, InvitationId>,
}

impl AccessState {
    /// Returns the ids in `role_ids` that do not resolve to a stored role.
    fn missing_roles<'a>(&self, role_ids: impl IntoIterator<Item = &'a RoleId>) -> Vec<RoleId> {
        role_ids
            .into_iter()
            .filter(|role_id| !self.roles.contains_key(*role_id))
            .copied()
            .collect()
    }

    /// Strips deleted roles from every user and invitation.
    fn detach_roles(&mut self, role_ids: &[RoleId]) {
        if role_ids.is_empty() {
            return;
        }

        for stored in self.users.values_mut() {
            if stored.user.remove_roles(role_ids) {
                stored.version += 1;
            }
        }

        for invitation in self.invitations.values_mut() {
            invitation.remove_roles(role_ids);
        }
    }
}

fn roles_not_found(missing: &[RoleId]) -> AppError {
    let missing = missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    AppError::NotFound(format!("roles not found: {missing}"))
}

/// In-memory access store for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    state: RwLock<AccessState>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
