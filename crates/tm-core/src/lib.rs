//! # tm-core
//!
//! Core types and configuration for Tasking Manager RS.
//!
//! This crate provides the foundational building blocks used across the
//! notification stack:
//! - Common type aliases
//! - Mail and application configuration with environment loading

pub mod config;
pub mod types;

pub use config::{AppConfig, ConfigError, MailConfig, SmtpConfig, VerificationConfig};
pub use types::Id;
