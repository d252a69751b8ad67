//! Email verification token service
//!
//! Generates and validates the signed token carried by the `/verify-email/`
//! link. The token is an HS256 JWT binding `(email, username)` with an
//! issued-at, a configurable expiry, and a random `jti`, so two tokens for
//! the same inputs never compare equal.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use tm_core::config::VerificationConfig;

/// Path of the verification endpoint the generated URL points at
pub const VERIFY_EMAIL_PATH: &str = "/verify-email/";

/// Claims embedded in a verification token
#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationClaims {
    /// Email address being verified
    pub email: String,
    /// Username the address belongs to
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Random token ID; makes every token unique
    pub jti: String,
}

/// Verification token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Token was issued for a different email address")]
    EmailMismatch,
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A validated `(email, username)` pair extracted from a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedEmail {
    pub email: String,
    pub username: String,
}

/// Service for creating and validating email verification tokens
pub struct VerificationTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl VerificationTokenService {
    /// Create a new service with the given secret and token lifetime
    pub fn new(secret: &[u8], expiry: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry,
        }
    }

    /// Create from application configuration
    pub fn from_config(config: &VerificationConfig) -> Self {
        Self::new(config.secret.as_bytes(), config.token_expiry())
    }

    /// Generate a signed verification token for an email/username pair
    pub fn generate_token(&self, email: &str, username: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now + self.expiry;

        let claims = VerificationClaims {
            email: email.to_string(),
            username: username.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Build the absolute verification URL sent to the user
    ///
    /// The URL path is [`VERIFY_EMAIL_PATH`]; the query carries `username`
    /// in plain text and `token` as the opaque signed string.
    pub fn verification_url(
        &self,
        base_url: &str,
        email: &str,
        username: &str,
    ) -> Result<Url, TokenError> {
        let token = self.generate_token(email, username)?;

        let mut url = Url::parse(base_url)
            .map_err(|e| TokenError::InvalidBaseUrl(e.to_string()))?;
        url.set_path(VERIFY_EMAIL_PATH);
        url.query_pairs_mut()
            .append_pair("username", username)
            .append_pair("token", &token);

        Ok(url)
    }

    /// Validate a token and check it was issued for `expected_email`
    pub fn validate_token(
        &self,
        token: &str,
        expected_email: &str,
    ) -> Result<VerifiedEmail, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<VerificationClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        let claims = token_data.claims;
        if claims.email != expected_email {
            return Err(TokenError::EmailMismatch);
        }

        Ok(VerifiedEmail {
            email: claims.email,
            username: claims.username,
        })
    }
}
