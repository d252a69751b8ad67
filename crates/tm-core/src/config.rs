//! Configuration types and loading
//!
//! All configuration is carried in explicit structs that are injected where
//! they are needed; nothing reads ambient global state at call time. The
//! default sender is deliberately optional: its absence is only detected at
//! the first send attempt, where it is reported as a configuration error.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Public base URL of the application, used to build verification links
    pub base_url: String,

    /// Mail delivery configuration
    pub mail: MailConfig,

    /// Email verification token configuration
    pub verification: VerificationConfig,
}

/// Mail delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Default sender address; `None` means mail is not configured
    pub default_sender: Option<String>,
    /// Optional display name for the sender
    pub sender_name: Option<String>,
    /// SMTP relay settings, if an SMTP transport is in use
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub enable_starttls: bool,
    pub ssl: bool,
}

/// Email verification token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Secret used to sign verification tokens
    pub secret: String,
    /// Token lifetime in hours
    pub token_expiry_hours: i64,
}

impl VerificationConfig {
    /// Token lifetime as a duration
    pub fn token_expiry(&self) -> Duration {
        Duration::hours(self.token_expiry_hours)
    }
}

impl MailConfig {
    /// Check whether a default sender identity is present
    pub fn has_sender(&self) -> bool {
        self.default_sender
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            mail: MailConfig {
                default_sender: None,
                sender_name: Some("Tasking Manager".to_string()),
                smtp: None,
            },
            verification: VerificationConfig {
                secret: "change-me-in-production".to_string(),
                token_expiry_hours: 24,
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("TM_APP_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(from) = std::env::var("TM_EMAIL_FROM_ADDRESS") {
            config.mail.default_sender = Some(from);
        }
        if let Ok(name) = std::env::var("TM_ORG_NAME") {
            config.mail.sender_name = Some(name);
        }

        if let Ok(host) = std::env::var("TM_SMTP_HOST") {
            config.mail.smtp = Some(SmtpConfig {
                host,
                port: std::env::var("TM_SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username: std::env::var("TM_SMTP_USER").ok(),
                password: std::env::var("TM_SMTP_PASSWORD").ok(),
                enable_starttls: std::env::var("TM_SMTP_USE_TLS")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(true),
                ssl: std::env::var("TM_SMTP_USE_SSL")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            });
        }

        if let Ok(secret) = std::env::var("TM_SECRET") {
            config.verification.secret = secret;
        }
        if let Ok(hours) = std::env::var("TM_TOKEN_EXPIRY_HOURS") {
            config.verification.token_expiry_hours =
                hours.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "TM_TOKEN_EXPIRY_HOURS".to_string(),
                    message: format!("not an integer: {hours}"),
                })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.mail.default_sender.is_none());
        assert!(!config.mail.has_sender());
        assert_eq!(config.verification.token_expiry_hours, 24);
    }

    #[test]
    fn test_has_sender_rejects_blank() {
        let mut mail = MailConfig {
            default_sender: Some("  ".to_string()),
            sender_name: None,
            smtp: None,
        };
        assert!(!mail.has_sender());

        mail.default_sender = Some("noreply@example.com".to_string());
        assert!(mail.has_sender());
    }

    #[test]
    fn test_token_expiry_duration() {
        let verification = VerificationConfig {
            secret: "s".to_string(),
            token_expiry_hours: 48,
        };
        assert_eq!(verification.token_expiry(), Duration::hours(48));
    }
}
