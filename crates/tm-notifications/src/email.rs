//! Email message model and mail transport boundary

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("SMTP error: {0}")]
    SmtpError(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Format as RFC 5322
    pub fn to_rfc5322(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// Email message handed to the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Message ID
    pub id: String,
    /// Sender address
    pub from: EmailAddress,
    /// Recipient address
    pub to: EmailAddress,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: String,
    /// HTML body
    pub html_body: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl EmailMessage {
    /// Create a new email message
    pub fn new(
        from: EmailAddress,
        to: EmailAddress,
        subject: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from,
            to,
            subject: subject.into(),
            text_body: text_body.into(),
            html_body: None,
            created_at: Utc::now(),
        }
    }

    /// Add HTML body
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }
}

/// Mail transport boundary
///
/// The service is fire-and-forget: a transport failure propagates to the
/// caller unmodified, with no retry here.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Hand a message to the transport
    async fn send(&self, message: &EmailMessage) -> TransportResult<()>;
}

/// Console transport (for development)
pub struct ConsoleTransport;

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for ConsoleTransport {
    async fn send(&self, message: &EmailMessage) -> TransportResult<()> {
        println!("=== EMAIL ===");
        println!("From: {}", message.from.to_rfc5322());
        println!("To: {}", message.to.to_rfc5322());
        println!("Subject: {}", message.subject);
        println!("---");
        println!("{}", message.text_body);
        println!("=============");

        Ok(())
    }
}

/// Recording transport that captures sent messages (for tests)
pub struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
    send_count: AtomicUsize,
    fail_with: Option<String>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            send_count: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    /// Make every send fail with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            send_count: AtomicUsize::new(0),
            fail_with: Some(message.into()),
        }
    }

    /// Number of messages handed to this transport
    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Messages successfully recorded
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &EmailMessage) -> TransportResult<()> {
        self.send_count.fetch_add(1, Ordering::SeqCst);

        if let Some(ref reason) = self.fail_with {
            return Err(TransportError::SendFailed(reason.clone()));
        }

        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_address_format() {
        let addr = EmailAddress::new("test@example.com").with_name("Test User");
        assert_eq!(addr.to_rfc5322(), "Test User <test@example.com>");

        let addr2 = EmailAddress::new("no-name@example.com");
        assert_eq!(addr2.to_rfc5322(), "no-name@example.com");
    }

    #[test]
    fn test_email_message_creation() {
        let from = EmailAddress::new("noreply@example.com").with_name("Tasking Manager");
        let to = EmailAddress::new("user@example.com");

        let message = EmailMessage::new(from, to, "Test Subject", "Test body")
            .with_html("<p>Test body</p>");

        assert_eq!(message.subject, "Test Subject");
        assert!(message.html_body.is_some());
    }

    #[tokio::test]
    async fn test_console_transport() {
        let transport = ConsoleTransport::new();
        let message = EmailMessage::new(
            EmailAddress::new("test@example.com"),
            EmailAddress::new("user@example.com"),
            "Test",
            "Test body",
        );

        assert!(transport.send(&message).await.is_ok());
    }

    #[tokio::test]
    async fn test_recording_transport_records() {
        let transport = RecordingTransport::new();
        let message = EmailMessage::new(
            EmailAddress::new("test@example.com"),
            EmailAddress::new("user@example.com"),
            "Test",
            "Test body",
        );

        transport.send(&message).await.unwrap();
        assert_eq!(transport.send_count(), 1);
        assert_eq!(transport.sent().await[0].subject, "Test");
    }

    #[tokio::test]
    async fn test_recording_transport_failure() {
        let transport = RecordingTransport::failing("connection refused");
        let message = EmailMessage::new(
            EmailAddress::new("test@example.com"),
            EmailAddress::new("user@example.com"),
            "Test",
            "Test body",
        );

        let err = transport.send(&message).await.unwrap_err();
        assert!(matches!(err, TransportError::SendFailed(_)));
    }
}
