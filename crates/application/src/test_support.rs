use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use warden_core::{AppError, AppResult};
use warden_domain::{
    Application, ApplicationId, AuditAction, EmailAddress, Invitation, InvitationId, Role, RoleId,
    User, UserId,
};

use crate::access_ports::{
    AuditEvent, AuditRepository, CatalogRepository, EmailService, InvitationAcceptance,
    InvitationRepository, StoredUser, UserRepository, VersionedWrite,
};
use crate::{CatalogService, InvitationPolicy, InvitationService, StoragePolicy, UserService};

#[derive(Default)]
struct FakeState {
    users: HashMap<UserId, StoredUser>,
    applications: HashMap<ApplicationId, Application>,
    roles: HashMap<RoleId, Role>,
    invitations: HashMap<InvitationId, Invitation>,
}

impl FakeState {
    fn missing_roles<'a>(&self, role_ids: impl IntoIterator<Item = &'a RoleId>) -> Vec<RoleId> {
        role_ids
            .into_iter()
            .filter(|role_id| !self.roles.contains_key(*role_id))
            .copied()
            .collect()
    }

    fn delete_roles(&mut self, role_ids: &[RoleId]) {
        self.roles.retain(|role_id, _| !role_ids.contains(role_id));
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

/// Single-lock fake implementing every storage port.
#[derive(Default)]
pub(crate) struct FakeAccessStore {
    state: Mutex<FakeState>,
    events: Mutex<Vec<AuditEvent>>,
    stale_writes_remaining: AtomicU32,
    delete_roles_after_next_lookup: AtomicBool,
    fail_next_acceptance: AtomicBool,
    acceptance_delay_ms: AtomicU64,
}

impl FakeAccessStore {
    pub(crate) async fn audit_actions(&self) -> Vec<AuditAction> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| event.action)
            .collect()
    }

    /// Makes the next `count` user writes report a stale version.
    pub(crate) fn fail_next_user_writes_as_stale(&self, count: u32) {
        self.stale_writes_remaining.store(count, Ordering::SeqCst);
    }

    /// Deletes the roles found by the next `find_missing_roles` call right
    /// after it answers, as a concurrent `delete_role` would.
    pub(crate) fn delete_roles_after_next_lookup(&self) {
        self.delete_roles_after_next_lookup
            .store(true, Ordering::SeqCst);
    }

    /// Makes the next acceptance fail with a storage fault before committing.
    pub(crate) fn fail_next_acceptance(&self) {
        self.fail_next_acceptance.store(true, Ordering::SeqCst);
    }

    /// Stalls the next acceptance before it takes the store lock.
    pub(crate) fn delay_next_acceptance(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.acceptance_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub(crate) async fn insert_invitation(&self, invitation: Invitation) {
        self.state
            .lock()
            .await
            .invitations
            .insert(invitation.id(), invitation);
    }

    pub(crate) async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }
}

#[async_trait]
impl UserRepository for FakeAccessStore {
    async fn list_users(&self) -> AppResult<Vec<StoredUser>> {
        Ok(self.state.lock().await.users.values().cloned().collect())
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<StoredUser>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<StoredUser>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|stored| stored.user.email() == email)
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<StoredUser> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|stored| stored.user.email() == user.email())
        {
            return Err(AppError::Conflict("email taken".to_owned()));
        }

        let stored = StoredUser { user, version: 1 };
        state.users.insert(stored.user.id(), stored.clone());
        Ok(stored)
    }

    async fn update_user(&self, user: User, expected_version: u64) -> AppResult<VersionedWrite> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.users.get_mut(&user.id()) else {
            return Ok(VersionedWrite::Missing);
        };

        let forced_stale = self
            .stale_writes_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if forced_stale {
            // Simulates a concurrent writer bumping the version.
            stored.version += 1;
            return Ok(VersionedWrite::Stale);
        }

        if stored.version != expected_version {
            return Ok(VersionedWrite::Stale);
        }

        let missing = state.missing_roles(user.role_ids());
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!("roles not found: {missing:?}")));
        }

        let version = expected_version + 1;
        state.users.insert(user.id(), StoredUser { user, version });
        Ok(VersionedWrite::Applied { version })
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.state.lock().await.users.remove(&user_id).is_some())
    }
}

#[async_trait]
impl CatalogRepository for FakeAccessStore {
    async fn create_application(&self, application: Application) -> AppResult<()> {
        self.state
            .lock()
            .await
            .applications
            .insert(application.id(), application);
        Ok(())
    }

    async fn list_applications(&self) -> AppResult<Vec<Application>> {
        Ok(self
            .state
            .lock()
            .await
            .applications
            .values()
            .cloned()
            .collect())
    }

    async fn find_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Option<Application>> {
        Ok(self
            .state
            .lock()
            .await
            .applications
            .get(&application_id)
            .cloned())
    }

    async fn update_application(&self, application: Application) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.applications.get_mut(&application.id()) else {
            return Ok(false);
        };
        *stored = application;
        Ok(true)
    }

    async fn delete_application(
        &self,
        application_id: ApplicationId,
    ) -> AppResult<Option<Vec<RoleId>>> {
        let mut state = self.state.lock().await;
        if state.applications.remove(&application_id).is_none() {
            return Ok(None);
        }

        let removed: Vec<RoleId> = state
            .roles
            .values()
            .filter(|role| role.application_id() == application_id)
            .map(Role::id)
            .collect();
        state.delete_roles(&removed);

        Ok(Some(removed))
    }

    async fn create_role(&self, role: Role) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.applications.contains_key(&role.application_id()) {
            return Err(AppError::NotFound("application".to_owned()));
        }
        if state.roles.values().any(|existing| {
            existing.application_id() == role.application_id()
                && existing.has_name(role.name().as_str())
        }) {
            return Err(AppError::Conflict("role name taken".to_owned()));
        }

        state.roles.insert(role.id(), role);
        Ok(())
    }

    async fn list_roles(&self, application_id: ApplicationId) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .values()
            .filter(|role| role.application_id() == application_id)
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.lock().await.roles.get(&role_id).cloned())
    }

    async fn find_missing_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<RoleId>> {
        let mut state = self.state.lock().await;
        let missing = state.missing_roles(role_ids);

        if self.delete_roles_after_next_lookup.swap(false, Ordering::SeqCst) {
            let found: Vec<RoleId> = role_ids
                .iter()
                .filter(|role_id| !missing.contains(role_id))
                .copied()
                .collect();
            state.delete_roles(&found);
        }

        Ok(missing)
    }

    async fn update_role(&self, role: Role) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.roles.get_mut(&role.id()) else {
            return Ok(false);
        };
        *stored = role;
        Ok(true)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if !state.roles.contains_key(&role_id) {
            return Ok(false);
        }
        state.delete_roles(&[role_id]);
        Ok(true)
    }
}

#[async_trait]
impl InvitationRepository for FakeAccessStore {
    async fn create_invitation(&self, invitation: Invitation) -> AppResult<()> {
        self.insert_invitation(invitation).await;
        Ok(())
    }

    async fn find_invitation(
        &self,
        invitation_id: InvitationId,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .state
            .lock()
            .await
            .invitations
            .get(&invitation_id)
            .cloned())
    }

    async fn find_invitation_by_token_hash(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .state
            .lock()
            .await
            .invitations
            .values()
            .find(|invitation| invitation.token_hash() == token_hash)
            .cloned())
    }

    async fn list_invitations(&self) -> AppResult<Vec<Invitation>> {
        Ok(self
            .state
            .lock()
            .await
            .invitations
            .values()
            .cloned()
            .collect())
    }

    async fn accept_invitation(
        &self,
        token_hash: &str,
        accepted_at: DateTime<Utc>,
    ) -> AppResult<Option<InvitationAcceptance>> {
        let delay_ms = self.acceptance_delay_ms.swap(0, Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let mut state = self.state.lock().await;
        let Some(mut invitation) = state
            .invitations
            .values()
            .find(|invitation| invitation.token_hash() == token_hash)
            .cloned()
        else {
            return Ok(None);
        };

        invitation.consume(accepted_at)?;
        let missing = state.missing_roles(invitation.pre_assigned_role_ids());
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!("roles not found: {missing:?}")));
        }

        let existing = state
            .users
            .values()
            .find(|stored| stored.user.email() == invitation.email())
            .cloned();
        let user_created = existing.is_none();
        let mut stored = existing.unwrap_or_else(|| StoredUser {
            user: User::new(invitation.email().clone(), accepted_at),
            version: 0,
        });
        if stored
            .user
            .assign_roles(invitation.pre_assigned_role_ids().iter().copied())
            || user_created
        {
            stored.version += 1;
        }

        if self.fail_next_acceptance.swap(false, Ordering::SeqCst) {
            return Err(AppError::StorageFault(
                "connection reset before commit".to_owned(),
            ));
        }

        state.users.insert(stored.user.id(), stored.clone());
        state.invitations.insert(invitation.id(), invitation.clone());
        Ok(Some(InvitationAcceptance {
            invitation,
            user: stored,
            user_created,
        }))
    }

    async fn revoke_invitation(
        &self,
        invitation_id: InvitationId,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<Invitation>> {
        let mut state = self.state.lock().await;
        let Some(invitation) = state.invitations.get_mut(&invitation_id) else {
            return Ok(None);
        };

        invitation.revoke(revoked_at)?;
        Ok(Some(invitation.clone()))
    }

    async fn purge_expired_invitations(&self, expired_before: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.invitations.len();
        state
            .invitations
            .retain(|_, invitation| invitation.is_used() || invitation.expires_at() >= expired_before);
        Ok(u64::try_from(before - state.invitations.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl AuditRepository for FakeAccessStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// One delivery captured by [`RecordingEmailService`].
#[derive(Debug, Clone)]
pub(crate) struct SentEmail {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) text_body: String,
    pub(crate) html_body: Option<String>,
}

/// Email fake that records deliveries and can be told to fail.
#[derive(Default)]
pub(crate) struct RecordingEmailService {
    pub(crate) sent: Mutex<Vec<SentEmail>>,
    pub(crate) fail: AtomicBool,
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("smtp relay unavailable".to_owned()));
        }

        self.sent.lock().await.push(SentEmail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            text_body: text_body.to_owned(),
            html_body: html_body.map(str::to_owned),
        });
        Ok(())
    }
}

/// Fully wired services over one fake store.
pub(crate) struct Harness {
    pub(crate) store: Arc<FakeAccessStore>,
    pub(crate) email: Arc<RecordingEmailService>,
    pub(crate) users: UserService,
    pub(crate) catalog: CatalogService,
    pub(crate) invitations: InvitationService,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let store = Arc::new(FakeAccessStore::default());
        let email = Arc::new(RecordingEmailService::default());
        let storage_policy = StoragePolicy::default();

        let users = UserService::new(store.clone(), store.clone(), store.clone(), storage_policy);
        let catalog = CatalogService::new(store.clone(), store.clone(), storage_policy);
        let invitations = InvitationService::new(
            store.clone(),
            store.clone(),
            email.clone(),
            store.clone(),
            InvitationPolicy::default(),
            storage_policy,
        );

        Self {
            store,
            email,
            users,
            catalog,
            invitations,
        }
    }

    /// Registers an application with the given role names.
    pub(crate) async fn seed_roles(&self, names: &[&str]) -> Vec<RoleId> {
        let application = self
            .catalog
            .create_application(crate::CreateApplicationInput {
                url: "https://crm.example.com".to_owned(),
                name: "CRM".to_owned(),
                description: None,
            })
            .await
            .unwrap_or_else(|_| unreachable!());

        let mut role_ids = Vec::new();
        for name in names {
            let role = self
                .catalog
                .create_role(crate::CreateRoleInput {
                    application_id: application.id(),
                    name: (*name).to_owned(),
                    permissions: vec![(format!("{}.read", name.to_lowercase()), true)],
                })
                .await
                .unwrap_or_else(|_| unreachable!());
            role_ids.push(role.id());
        }

        role_ids
    }
}
