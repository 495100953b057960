//! Warden access worker runtime.
//!
//! Wires the access services over the in-memory adapters, optionally invites
//! a bootstrap administrator and then purges long-expired invitations on a
//! fixed interval until interrupted.

#![forbid(unsafe_code)]

mod bootstrap;
mod worker_config;

use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use warden_application::{CatalogService, EmailService, InvitationService, UserService};
use warden_core::{AppError, AppResult};
use warden_infrastructure::{
    ConsoleEmailService, InMemoryAccessStore, InMemoryAuditLog, SmtpEmailService,
};

use crate::worker_config::{EmailProviderConfig, WorkerConfig, init_tracing};

struct WorkerServices {
    users: UserService,
    catalog: CatalogService,
    invitations: InvitationService,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let services = build_services(&config)?;

    info!(
        sweep_interval_seconds = config.sweep_interval.as_secs(),
        retention_hours = config.invitation_retention.num_hours(),
        invitation_ttl_hours = config.invitation_policy.ttl().num_hours(),
        "warden-worker started"
    );

    if let Some(admin_email) = config.bootstrap_admin_email.as_deref() {
        bootstrap::invite_admin(
            &services.users,
            &services.catalog,
            &services.invitations,
            admin_email,
        )
        .await?;
    }

    run_sweeper(&services.invitations, &config).await;

    info!("warden-worker stopped");
    Ok(())
}

fn build_services(config: &WorkerConfig) -> AppResult<WorkerServices> {
    let store = Arc::new(InMemoryAccessStore::new());
    let audit_log = Arc::new(InMemoryAuditLog::new());
    let email_service: Arc<dyn EmailService> = match &config.email_provider {
        EmailProviderConfig::Console => Arc::new(ConsoleEmailService::new()),
        EmailProviderConfig::Smtp(smtp) => Arc::new(SmtpEmailService::new(smtp.clone())?),
    };

    let users = UserService::new(
        store.clone(),
        store.clone(),
        audit_log.clone(),
        config.storage_policy,
    );
    let catalog = CatalogService::new(store.clone(), audit_log.clone(), config.storage_policy);
    let invitations = InvitationService::new(
        store.clone(),
        store,
        email_service,
        audit_log,
        config.invitation_policy.clone(),
        config.storage_policy,
    );

    Ok(WorkerServices {
        users,
        catalog,
        invitations,
    })
}

async fn run_sweeper(invitations: &InvitationService, config: &WorkerConfig) {
    let mut interval = tokio::time::interval(config.sweep_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match invitations.purge_expired(config.invitation_retention).await {
                    Ok(purged) => debug!(purged, "invitation sweep completed"),
                    Err(error) => {
                        warn!(
                            error = %error,
                            retryable = error.is_retryable(),
                            "invitation sweep failed"
                        );
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    warn!(error = %error, "failed to listen for shutdown signal");
                }
                info!("shutdown signal received");
                break;
            }
        }
    }
}
