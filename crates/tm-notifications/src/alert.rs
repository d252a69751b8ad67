//! Alert request model

use serde::{Deserialize, Serialize};

use tm_core::types::Id;
use tm_db::preferences::NotificationPreferences;

/// Category of the message behind an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// System generated message
    System,
    /// Broadcast to all contributors of a project
    Broadcast,
    /// User was mentioned in a comment
    MentionNotification,
    /// A task the user mapped was validated
    ValidationNotification,
    /// A task the user mapped was invalidated
    InvalidationNotification,
    /// Invitation to join a team
    InvitationNotification,
    /// Comment posted to a project's chat
    ProjectChatNotification,
    /// Comment posted on one of the user's tasks
    TaskCommentNotification,
}

impl MessageType {
    /// Whether this category is a comment alert subject to the
    /// per-user comment preference flags
    pub fn is_comment(&self) -> bool {
        matches!(
            self,
            Self::ProjectChatNotification | Self::TaskCommentNotification
        )
    }
}

/// A single email alert attempt
///
/// Constructed per call and consumed once; never stored.
#[derive(Debug, Clone)]
pub struct AlertRequest {
    /// Recipient address; empty when the user has no email on file
    pub to_address: String,
    /// Recipient username
    pub username: String,
    /// Whether the recipient's email address is verified
    pub user_email_verified: bool,
    /// ID of the message being announced
    pub message_id: Id,
    /// Username of the message author
    pub from_username: String,
    /// Related project, if any
    pub project_id: Option<Id>,
    /// Related task, if any
    pub task_id: Option<Id>,
    /// Message subject
    pub subject: String,
    /// Message body
    pub content: String,
    /// Message category
    pub message_type: MessageType,
}

impl AlertRequest {
    pub fn new(
        to_address: impl Into<String>,
        username: impl Into<String>,
        user_email_verified: bool,
        message_id: Id,
        from_username: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
        message_type: MessageType,
    ) -> Self {
        Self {
            to_address: to_address.into(),
            username: username.into(),
            user_email_verified,
            message_id,
            from_username: from_username.into(),
            project_id: None,
            task_id: None,
            subject: subject.into(),
            content: content.into(),
            message_type,
        }
    }

    /// Set the related project
    pub fn with_project(mut self, project_id: Id) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Set the related task
    pub fn with_task(mut self, task_id: Id) -> Self {
        self.task_id = Some(task_id);
        self
    }
}

/// Check whether a comment alert of the given category is wanted
///
/// Project chat and task comment alerts are gated by their own flag; the
/// two flags are independent. Non-comment categories are always wanted.
pub fn wants_comment_alert(preferences: &NotificationPreferences, message_type: MessageType) -> bool {
    match message_type {
        MessageType::ProjectChatNotification => preferences.projects_comments_notifications,
        MessageType::TaskCommentNotification => preferences.tasks_comments_notifications,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_request_builder() {
        let request = AlertRequest::new(
            "hot-test@mailinator.com",
            "Iain Hunter",
            true,
            1,
            "Aadesh Baral",
            "test subject",
            "test content",
            MessageType::TaskCommentNotification,
        )
        .with_project(1)
        .with_task(1);

        assert_eq!(request.project_id, Some(1));
        assert_eq!(request.task_id, Some(1));
        assert!(request.message_type.is_comment());
    }

    #[test]
    fn test_comment_alert_flags_are_independent() {
        let prefs = NotificationPreferences {
            projects_comments_notifications: true,
            tasks_comments_notifications: false,
        };

        assert!(wants_comment_alert(&prefs, MessageType::ProjectChatNotification));
        assert!(!wants_comment_alert(&prefs, MessageType::TaskCommentNotification));

        let prefs = NotificationPreferences {
            projects_comments_notifications: false,
            tasks_comments_notifications: true,
        };

        assert!(!wants_comment_alert(&prefs, MessageType::ProjectChatNotification));
        assert!(wants_comment_alert(&prefs, MessageType::TaskCommentNotification));
    }

    #[test]
    fn test_non_comment_categories_always_wanted() {
        let prefs = NotificationPreferences::default();

        assert!(wants_comment_alert(&prefs, MessageType::System));
        assert!(wants_comment_alert(&prefs, MessageType::MentionNotification));
    }
}
