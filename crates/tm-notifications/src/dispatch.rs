//! Dispatcher
//!
//! Builds the outgoing message and hands it to the mail transport. The one
//! precondition enforced here is that a default sender identity exists in
//! the injected mail configuration: its absence is a deployment defect and
//! is raised loudly at the first send attempt, never swallowed.

use std::sync::Arc;

use thiserror::Error;

use tm_core::config::MailConfig;

use crate::email::{EmailAddress, EmailMessage, MailTransport, TransportError};

/// Dispatch errors
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No default sender configured for outgoing mail")]
    SenderNotConfigured,
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Hands formatted messages to the mail transport
///
/// Performs no eligibility check; it trusts the alert gate evaluated by the
/// notification service.
pub struct Dispatcher {
    config: MailConfig,
    transport: Arc<dyn MailTransport>,
}

impl Dispatcher {
    pub fn new(config: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    /// Send a message to a single recipient
    ///
    /// Fails with [`DispatchError::SenderNotConfigured`] before touching the
    /// transport when no default sender identity is present.
    pub async fn send(
        &self,
        to_address: &str,
        subject: &str,
        content_html: &str,
        content_text: &str,
    ) -> DispatchResult<()> {
        let sender = self.sender()?;

        let message = EmailMessage::new(
            sender,
            EmailAddress::new(to_address),
            subject,
            content_text,
        )
        .with_html(content_html);

        tracing::debug!(
            message_id = %message.id,
            to = to_address,
            subject,
            "Dispatching email"
        );

        self.transport.send(&message).await?;
        Ok(())
    }

    fn sender(&self) -> DispatchResult<EmailAddress> {
        let address = self
            .config
            .default_sender
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(DispatchError::SenderNotConfigured)?;

        let sender = EmailAddress::new(address);
        Ok(match &self.config.sender_name {
            Some(name) => sender.with_name(name),
            None => sender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::RecordingTransport;

    fn configured_mail() -> MailConfig {
        MailConfig {
            default_sender: Some("noreply@tasks.example.com".to_string()),
            sender_name: Some("Tasking Manager".to_string()),
            smtp: None,
        }
    }

    fn unconfigured_mail() -> MailConfig {
        MailConfig {
            default_sender: None,
            sender_name: None,
            smtp: None,
        }
    }

    #[tokio::test]
    async fn test_send_fails_without_sender() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Dispatcher::new(unconfigured_mail(), transport.clone());

        let err = dispatcher
            .send("user@example.com", "subject", "<p>hi</p>", "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::SenderNotConfigured));
        // The transport must never be touched on a configuration error
        assert_eq!(transport.send_count(), 0);
    }

    #[tokio::test]
    async fn test_send_with_sender_configured() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Dispatcher::new(configured_mail(), transport.clone());

        dispatcher
            .send("user@example.com", "subject", "<p>hi</p>", "hi")
            .await
            .unwrap();

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].from.to_rfc5322(),
            "Tasking Manager <noreply@tasks.example.com>"
        );
        assert_eq!(sent[0].to.email, "user@example.com");
        assert_eq!(sent[0].html_body.as_deref(), Some("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_blank_sender_counts_as_unconfigured() {
        let mut config = configured_mail();
        config.default_sender = Some("  ".to_string());

        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Dispatcher::new(config, transport);

        let err = dispatcher
            .send("user@example.com", "subject", "<p>hi</p>", "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::SenderNotConfigured));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = Arc::new(RecordingTransport::failing("connection refused"));
        let dispatcher = Dispatcher::new(configured_mail(), transport);

        let err = dispatcher
            .send("user@example.com", "subject", "<p>hi</p>", "hi")
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Transport(_)));
    }
}
