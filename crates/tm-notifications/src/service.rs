//! Notification service
//!
//! Composition root of the alert path: evaluates the gate, formats the
//! message for its category, and invokes the dispatcher. Routine skips are a
//! boolean `false`, never an error; configuration and transport failures
//! propagate so callers can tell "skipped" from "broken".

use thiserror::Error;

use tm_auth::verification::{TokenError, VerificationTokenService};

use crate::alert::{AlertRequest, MessageType};
use crate::dispatch::{DispatchError, Dispatcher};
use crate::gate::AlertGate;

/// Service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("Verification token error: {0}")]
    Token(#[from] TokenError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Email alerting service
///
/// Holds no per-recipient state: repeated calls are independent, and a burst
/// of eligible requests for the same recipient all dispatch.
pub struct NotificationService {
    dispatcher: Dispatcher,
    tokens: VerificationTokenService,
    base_url: String,
}

impl NotificationService {
    pub fn new(
        dispatcher: Dispatcher,
        tokens: VerificationTokenService,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            tokens,
            base_url: base_url.into(),
        }
    }

    /// Send an email alert for a message
    ///
    /// Returns `Ok(false)` when the recipient is ineligible (routine skip),
    /// `Ok(true)` when the message was handed to the transport. Dispatcher
    /// errors propagate unchanged.
    pub async fn send_email_alert(&self, request: &AlertRequest) -> ServiceResult<bool> {
        if !AlertGate::may_send(request.user_email_verified, &request.to_address) {
            return Ok(false);
        }

        let subject = render_subject(request);
        let text_body = render_text_body(request);
        let html_body = render_html_body(request);

        self.dispatcher
            .send(&request.to_address, &subject, &html_body, &text_body)
            .await?;

        tracing::info!(
            message_id = request.message_id,
            to = %request.to_address,
            message_type = ?request.message_type,
            "Email alert sent"
        );

        Ok(true)
    }

    /// Send an email verification link to a newly supplied address
    ///
    /// The recipient is by definition unverified, so this path only requires
    /// a non-empty address. Returns `Ok(false)` when no address is on file.
    pub async fn send_verification_email(
        &self,
        email: &str,
        username: &str,
    ) -> ServiceResult<bool> {
        if email.trim().is_empty() {
            tracing::debug!("Verification email skipped: no address supplied");
            return Ok(false);
        }

        let url = self
            .tokens
            .verification_url(&self.base_url, email, username)?;

        let subject = "Confirm your email address";
        let text_body = format!(
            "Hi {username},\n\n\
             Please confirm this email address belongs to you by opening the \
             link below:\n\n{url}\n\n\
             If you did not request this, you can ignore this message.\n"
        );
        let html_body = format!(
            "<p>Hi {username},</p>\
             <p>Please confirm this email address belongs to you:</p>\
             <p><a href=\"{url}\">Confirm email address</a></p>\
             <p>If you did not request this, you can ignore this message.</p>"
        );

        self.dispatcher
            .send(email, subject, &html_body, &text_body)
            .await?;

        tracing::info!(to = email, "Verification email sent");
        Ok(true)
    }
}

fn render_subject(request: &AlertRequest) -> String {
    format!("[Tasking Manager] {}", request.subject)
}

/// Contextual line naming what the alert is about, per category
fn render_context_line(request: &AlertRequest) -> String {
    match (request.message_type, request.project_id, request.task_id) {
        (MessageType::TaskCommentNotification, Some(project_id), Some(task_id)) => format!(
            "{} commented on task {} of project {}.",
            request.from_username, task_id, project_id
        ),
        (MessageType::ProjectChatNotification, Some(project_id), _) => format!(
            "{} left a comment on project {}.",
            request.from_username, project_id
        ),
        (MessageType::MentionNotification, _, _) => {
            format!("{} mentioned you in a comment.", request.from_username)
        }
        _ => format!("You have a new message from {}.", request.from_username),
    }
}

fn render_text_body(request: &AlertRequest) -> String {
    format!(
        "Hi {},\n\n{}\n\n{}\n\nView the full message: {}\n",
        request.username,
        render_context_line(request),
        request.content,
        message_link_hint(request),
    )
}

fn render_html_body(request: &AlertRequest) -> String {
    format!(
        "<p>Hi {},</p><p>{}</p><p>{}</p><p>{}</p>",
        request.username,
        render_context_line(request),
        request.content,
        message_link_hint(request),
    )
}

fn message_link_hint(request: &AlertRequest) -> String {
    format!("message #{}", request.message_id)
}
