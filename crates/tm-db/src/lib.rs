//! # tm-db
//!
//! User notification preference storage for Tasking Manager RS.
//!
//! This crate provides the persistence boundary of the notification stack:
//!
//! - The [`PreferenceStore`] trait the notification service reads through
//! - An in-memory store for development and testing
//! - A PostgreSQL repository using SQLx
//! - The reversible schema migration that split the single
//!   `comments_notifications` flag into independent project and task flags

pub mod migrations;
pub mod preferences;
pub mod users;

pub use migrations::{Column, ColumnType, MigrationError, SplitCommentNotifications, TableSchema};
pub use preferences::{
    MemoryPreferenceStore, NotificationPreferences, PreferenceStore, Recipient, StoreError,
    StoreResult,
};
pub use users::{UserPreferenceRepository, UserRow};
