use chrono::Utc;
use tracing::{info, warn};

use warden_core::{AppError, AppResult};
use warden_domain::{AuditAction, EmailAddress, Invitation, InvitationDraft};

use super::token_crypto::generate_token;
use super::{CreateInvitationInput, InvitationService, IssuedInvitation, join_role_ids};

impl InvitationService {
    /// Issues a pending invitation and optionally notifies the invitee.
    ///
    /// A failed notification is logged and reported through
    /// [`IssuedInvitation::notified`]; the invitation stays valid.
    pub async fn create_invitation(
        &self,
        input: CreateInvitationInput,
    ) -> AppResult<IssuedInvitation> {
        let email = EmailAddress::new(&input.email)?;
        let role_ids = input.pre_assigned_role_ids.unwrap_or_default();

        let missing = self.missing_roles(&role_ids).await?;
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!(
                "roles not found: {}",
                join_role_ids(&missing)
            )));
        }

        let (raw_token, token_hash) = generate_token()?;
        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(self.policy.ttl())
            .ok_or_else(|| {
                AppError::Validation("invitation expiry is out of range".to_owned())
            })?;
        let invitation = Invitation::new(InvitationDraft {
            token_hash,
            email,
            identity_provider: input.identity_provider,
            pre_assigned_role_ids: role_ids,
            created_at,
            expires_at,
        })?;

        self.storage_policy
            .call(
                "create_invitation",
                self.repository.create_invitation(invitation.clone()),
            )
            .await?;

        info!(
            invitation_id = %invitation.id(),
            role_count = invitation.pre_assigned_role_ids().len(),
            expires_at = %invitation.expires_at(),
            "issued invitation"
        );
        self.record_event(
            AuditAction::InvitationCreated,
            invitation.id(),
            format!(
                "invited '{}' via '{}'",
                invitation.email(),
                invitation.identity_provider()
            ),
        )
        .await?;

        let notified = input.send_email && self.notify_invitee(&invitation, &raw_token).await;

        Ok(IssuedInvitation {
            invitation,
            token: raw_token,
            notified,
        })
    }

    async fn notify_invitee(&self, invitation: &Invitation, raw_token: &str) -> bool {
        let accept_link = self.policy.accept_link(raw_token);
        let expiry_days = self.policy.ttl().num_days().max(1);

        let subject = "You have been invited to Warden".to_owned();
        let text_body = format!(
            "You have been invited to join Warden using your {} account.\n\n\
             Open the link below to accept the invitation:\n{accept_link}\n\n\
             This link expires in {expiry_days} day(s) and can be used once.",
            invitation.identity_provider()
        );
        let html_body = format!(
            "<p>You have been invited to join Warden using your {} account.</p>\
             <p><a href=\"{link}\">Accept the invitation</a></p>\
             <p>This link expires in {expiry_days} day(s) and can be used once.</p>",
            escape_html(invitation.identity_provider().as_str()),
            link = escape_html(&accept_link),
        );

        match self
            .email_service
            .send_email(
                invitation.email().as_str(),
                &subject,
                &text_body,
                Some(&html_body),
            )
            .await
        {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    invitation_id = %invitation.id(),
                    error = %error,
                    "failed to send invitation email"
                );
                false
            }
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
