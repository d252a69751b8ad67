//! User preference repository
//!
//! PostgreSQL-backed implementation of the preference store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use tm_core::types::Id;

use crate::preferences::{
    NotificationPreferences, PreferenceStore, Recipient, StoreError, StoreResult,
};

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email_address: Option<String>,
    pub is_email_verified: bool,
    pub projects_comments_notifications: bool,
    pub tasks_comments_notifications: bool,
    pub date_registered: DateTime<Utc>,
}

impl UserRow {
    /// Preferences carried by this row
    pub fn preferences(&self) -> NotificationPreferences {
        NotificationPreferences {
            projects_comments_notifications: self.projects_comments_notifications,
            tasks_comments_notifications: self.tasks_comments_notifications,
        }
    }

    /// Recipient state for the alert gate
    pub fn recipient(&self) -> Recipient {
        Recipient {
            email: self.email_address.clone().unwrap_or_default(),
            email_verified: self.is_email_verified,
        }
    }
}

/// User preference repository implementation
pub struct UserPreferenceRepository {
    pool: PgPool,
}

impl UserPreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Id) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email_address, is_email_verified,
                   projects_comments_notifications, tasks_comments_notifications,
                   date_registered
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email_address, is_email_verified,
                   projects_comments_notifications, tasks_comments_notifications,
                   date_registered
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row)
    }

    /// Mark a user's email address as verified
    pub async fn mark_email_verified(&self, id: Id) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET is_email_verified = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(user_id = id, "Email address marked verified");
        Ok(())
    }

    async fn set_flag(&self, id: Id, column: &'static str, enabled: bool) -> StoreResult<()> {
        // Column name comes from a fixed set, never from input
        let query = format!("UPDATE users SET {column} = $1 WHERE id = $2");

        let result = sqlx::query(&query)
            .bind(enabled)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for UserPreferenceRepository {
    async fn get_preferences(&self, user_id: Id) -> StoreResult<NotificationPreferences> {
        let row = self
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::NotFound(user_id))?;

        Ok(row.preferences())
    }

    async fn set_project_comments(&self, user_id: Id, enabled: bool) -> StoreResult<()> {
        self.set_flag(user_id, "projects_comments_notifications", enabled)
            .await
    }

    async fn set_task_comments(&self, user_id: Id, enabled: bool) -> StoreResult<()> {
        self.set_flag(user_id, "tasks_comments_notifications", enabled)
            .await
    }

    async fn recipient(&self, user_id: Id) -> StoreResult<Recipient> {
        let row = self
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::NotFound(user_id))?;

        Ok(row.recipient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(email: Option<&str>, verified: bool) -> UserRow {
        UserRow {
            id: 1,
            username: "mrtest".to_string(),
            email_address: email.map(String::from),
            is_email_verified: verified,
            projects_comments_notifications: false,
            tasks_comments_notifications: true,
            date_registered: Utc::now(),
        }
    }

    #[test]
    fn test_row_preferences() {
        let row = sample_row(Some("test@test.com"), true);
        let prefs = row.preferences();
        assert!(!prefs.projects_comments_notifications);
        assert!(prefs.tasks_comments_notifications);
    }

    #[test]
    fn test_row_recipient_without_email() {
        let row = sample_row(None, false);
        let recipient = row.recipient();
        assert_eq!(recipient.email, "");
        assert!(!recipient.email_verified);
    }
}
