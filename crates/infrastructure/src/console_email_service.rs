//! Console email service for local runs. Writes messages to tracing output.

use async_trait::async_trait;
use tracing::info;

use warden_application::EmailService;
use warden_core::AppResult;

/// Email service that logs outgoing messages instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a new console email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        info!(
            to,
            subject,
            has_html = html_body.is_some(),
            "outgoing email (console)\n{text_body}"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use warden_application::EmailService;

    use super::ConsoleEmailService;

    #[tokio::test]
    async fn console_delivery_always_succeeds() {
        let service = ConsoleEmailService::new();
        let sent = service
            .send_email("grace@example.com", "Invitation", "hello", None)
            .await;
        assert!(sent.is_ok());
    }
}
