use tracing::{info, warn};

use warden_application::{
    CatalogService, CreateApplicationInput, CreateInvitationInput, CreateRoleInput,
    InvitationService, UserService,
};
use warden_core::AppResult;
use warden_domain::{EmailAddress, InvitationStatus};

const BOOTSTRAP_APPLICATION_NAME: &str = "Warden";
const BOOTSTRAP_APPLICATION_URL: &str = "http://localhost:3000";
const BOOTSTRAP_ROLE_NAME: &str = "administrator";
const BOOTSTRAP_PERMISSION: &str = "warden.admin";
const BOOTSTRAP_IDENTITY_PROVIDER: &str = "local";

/// Invites the bootstrap administrator unless the account or a pending
/// invitation for it already exists.
///
/// Returns whether an invitation was issued.
pub async fn invite_admin(
    users: &UserService,
    catalog: &CatalogService,
    invitations: &InvitationService,
    admin_email: &str,
) -> AppResult<bool> {
    if users.get_by_email(admin_email).await?.is_some() {
        info!("bootstrap administrator already exists, skipping invitation");
        return Ok(false);
    }

    let admin_email = EmailAddress::new(admin_email)?;
    let now = chrono::Utc::now();
    let already_invited = invitations
        .list_invitations()
        .await?
        .iter()
        .any(|invitation| {
            invitation.email() == &admin_email
                && invitation.status_at(now) == InvitationStatus::Pending
        });
    if already_invited {
        info!("bootstrap administrator invitation still pending, skipping");
        return Ok(false);
    }

    let application = match catalog
        .list_applications()
        .await?
        .into_iter()
        .find(|application| application.name().as_str() == BOOTSTRAP_APPLICATION_NAME)
    {
        Some(application) => application,
        None => {
            catalog
                .create_application(CreateApplicationInput {
                    url: BOOTSTRAP_APPLICATION_URL.to_owned(),
                    name: BOOTSTRAP_APPLICATION_NAME.to_owned(),
                    description: Some("Access management console".to_owned()),
                })
                .await?
        }
    };

    let role = match catalog
        .list_roles(application.id())
        .await?
        .into_iter()
        .find(|role| role.has_name(BOOTSTRAP_ROLE_NAME))
    {
        Some(role) => role,
        None => {
            catalog
                .create_role(CreateRoleInput {
                    application_id: application.id(),
                    name: BOOTSTRAP_ROLE_NAME.to_owned(),
                    permissions: vec![(BOOTSTRAP_PERMISSION.to_owned(), true)],
                })
                .await?
        }
    };

    let issued = invitations
        .create_invitation(CreateInvitationInput {
            email: admin_email.as_str().to_owned(),
            identity_provider: BOOTSTRAP_IDENTITY_PROVIDER.to_owned(),
            pre_assigned_role_ids: Some(vec![role.id()]),
            send_email: true,
        })
        .await?;

    if issued.notified {
        info!(
            invitation_id = %issued.invitation.id(),
            "bootstrap administrator invited"
        );
    } else {
        warn!(
            invitation_id = %issued.invitation.id(),
            "bootstrap administrator invitation issued but email delivery failed"
        );
    }

    Ok(true)
}
