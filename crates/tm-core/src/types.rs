//! Shared primitive types

/// Primary key type for users, projects, tasks, and messages
pub type Id = i64;
