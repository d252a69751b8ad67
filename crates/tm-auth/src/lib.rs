//! # tm-auth
//!
//! Email verification tokens for Tasking Manager RS.
//!
//! Provides a signed, expiring, tamper-evident token binding an email
//! address to a username, and the one-time verification URL it is embedded
//! in. Tokens are single-purpose: they prove control of an email address and
//! are never accepted as authentication credentials.

pub mod verification;

pub use verification::{
    TokenError, VerificationClaims, VerificationTokenService, VerifiedEmail, VERIFY_EMAIL_PATH,
};
