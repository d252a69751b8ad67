//! Notification preference store
//!
//! Persists, per user, two independent boolean flags: alerts for comments on
//! watched projects and alerts for comments on the user's tasks. The flags
//! replaced a single combined flag; both default to `false` for users whose
//! rows predate the split.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use tm_core::types::Id;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User not found: {0}")]
    NotFound(Id),
    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-user comment notification preferences
///
/// The two flags are independent; enabling one says nothing about the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Alert on comments posted to watched projects
    pub projects_comments_notifications: bool,
    /// Alert on comments posted to the user's tasks
    pub tasks_comments_notifications: bool,
}

impl Default for NotificationPreferences {
    /// Both flags start disabled, matching the migration backfill
    fn default() -> Self {
        Self {
            projects_comments_notifications: false,
            tasks_comments_notifications: false,
        }
    }
}

/// Recipient state read on the alert path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Email address on file; empty when the user never supplied one
    pub email: String,
    /// Whether the address has been verified
    pub email_verified: bool,
}

/// Storage boundary for notification preferences
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Get a user's comment notification preferences
    async fn get_preferences(&self, user_id: Id) -> StoreResult<NotificationPreferences>;

    /// Enable or disable project comment alerts
    async fn set_project_comments(&self, user_id: Id, enabled: bool) -> StoreResult<()>;

    /// Enable or disable task comment alerts
    async fn set_task_comments(&self, user_id: Id, enabled: bool) -> StoreResult<()>;

    /// Get the recipient state used by the alert gate
    async fn recipient(&self, user_id: Id) -> StoreResult<Recipient>;
}

#[derive(Debug, Clone)]
struct UserRecord {
    email: String,
    email_verified: bool,
    preferences: NotificationPreferences,
}

/// In-memory preference store for development/testing
pub struct MemoryPreferenceStore {
    users: RwLock<HashMap<Id, UserRecord>>,
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a user record
    pub async fn insert_user(&self, user_id: Id, email: impl Into<String>, email_verified: bool) {
        let mut users = self.users.write().await;
        users.insert(
            user_id,
            UserRecord {
                email: email.into(),
                email_verified,
                preferences: NotificationPreferences::default(),
            },
        );
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_preferences(&self, user_id: Id) -> StoreResult<NotificationPreferences> {
        let users = self.users.read().await;
        users
            .get(&user_id)
            .map(|u| u.preferences)
            .ok_or(StoreError::NotFound(user_id))
    }

    async fn set_project_comments(&self, user_id: Id, enabled: bool) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound(user_id))?;
        user.preferences.projects_comments_notifications = enabled;
        Ok(())
    }

    async fn set_task_comments(&self, user_id: Id, enabled: bool) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound(user_id))?;
        user.preferences.tasks_comments_notifications = enabled;
        Ok(())
    }

    async fn recipient(&self, user_id: Id) -> StoreResult<Recipient> {
        let users = self.users.read().await;
        users
            .get(&user_id)
            .map(|u| Recipient {
                email: u.email.clone(),
                email_verified: u.email_verified,
            })
            .ok_or(StoreError::NotFound(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preferences_default_to_disabled() {
        let store = MemoryPreferenceStore::new();
        store.insert_user(1, "user@example.com", true).await;

        let prefs = store.get_preferences(1).await.unwrap();
        assert!(!prefs.projects_comments_notifications);
        assert!(!prefs.tasks_comments_notifications);
    }

    #[tokio::test]
    async fn test_flags_are_independent() {
        let store = MemoryPreferenceStore::new();
        store.insert_user(1, "user@example.com", true).await;

        store.set_project_comments(1, true).await.unwrap();
        let prefs = store.get_preferences(1).await.unwrap();
        assert!(prefs.projects_comments_notifications);
        assert!(!prefs.tasks_comments_notifications);

        store.set_task_comments(1, true).await.unwrap();
        store.set_project_comments(1, false).await.unwrap();
        let prefs = store.get_preferences(1).await.unwrap();
        assert!(!prefs.projects_comments_notifications);
        assert!(prefs.tasks_comments_notifications);
    }

    #[tokio::test]
    async fn test_recipient_state() {
        let store = MemoryPreferenceStore::new();
        store.insert_user(1, "user@example.com", false).await;

        let recipient = store.recipient(1).await.unwrap();
        assert_eq!(recipient.email, "user@example.com");
        assert!(!recipient.email_verified);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let store = MemoryPreferenceStore::new();
        let err = store.get_preferences(99).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99)));
    }
}
