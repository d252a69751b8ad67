//! Preference schema migration
//!
//! Splits the single `comments_notifications` flag on `users` into
//! `projects_comments_notifications` and `tasks_comments_notifications`.
//! The legacy value is not carried forward: both new columns are backfilled
//! to `false` and then made `NOT NULL`. The downgrade restores the legacy
//! column (default `false`) and drops the two new ones, so the change is
//! fully reversible.
//!
//! The migration is modelled twice: as the SQL statements executed against
//! PostgreSQL, and as a pure transformation over a [`TableSchema`] so the
//! up/down round-trip can be checked without a database.

use sqlx::PgPool;
use thiserror::Error;

/// Migration errors
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Column already exists: {0}")]
    ColumnExists(String),
    #[error("Column missing: {0}")]
    ColumnMissing(String),
    #[error("Database error: {0}")]
    Database(String),
}

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    BigInt,
    Varchar,
    Timestamp,
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A table definition used to reason about schema changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    fn add_column(&mut self, column: Column) -> Result<(), MigrationError> {
        if self.has_column(&column.name) {
            return Err(MigrationError::ColumnExists(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    fn drop_column(&mut self, name: &str) -> Result<(), MigrationError> {
        if !self.has_column(name) {
            return Err(MigrationError::ColumnMissing(name.to_string()));
        }
        self.columns.retain(|c| c.name != name);
        Ok(())
    }

    fn set_not_null(&mut self, name: &str) -> Result<(), MigrationError> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| MigrationError::ColumnMissing(name.to_string()))?;
        column.nullable = false;
        Ok(())
    }
}

const LEGACY_COLUMN: &str = "comments_notifications";
const PROJECTS_COLUMN: &str = "projects_comments_notifications";
const TASKS_COLUMN: &str = "tasks_comments_notifications";

/// The comment notification split migration
pub struct SplitCommentNotifications;

impl SplitCommentNotifications {
    /// SQL statements for the upgrade, in execution order
    pub fn up_sql() -> Vec<String> {
        vec![
            format!("ALTER TABLE users ADD COLUMN {PROJECTS_COLUMN} BOOLEAN"),
            format!("ALTER TABLE users ADD COLUMN {TASKS_COLUMN} BOOLEAN"),
            format!("ALTER TABLE users DROP COLUMN {LEGACY_COLUMN}"),
            format!("UPDATE users SET {PROJECTS_COLUMN} = false"),
            format!("ALTER TABLE users ALTER COLUMN {PROJECTS_COLUMN} SET NOT NULL"),
            format!("UPDATE users SET {TASKS_COLUMN} = false"),
            format!("ALTER TABLE users ALTER COLUMN {TASKS_COLUMN} SET NOT NULL"),
        ]
    }

    /// SQL statements for the downgrade, in execution order
    pub fn down_sql() -> Vec<String> {
        vec![
            format!(
                "ALTER TABLE users ADD COLUMN {LEGACY_COLUMN} BOOLEAN NOT NULL DEFAULT false"
            ),
            format!("ALTER TABLE users DROP COLUMN {TASKS_COLUMN}"),
            format!("ALTER TABLE users DROP COLUMN {PROJECTS_COLUMN}"),
        ]
    }

    /// Apply the upgrade against a live database
    pub async fn upgrade(pool: &PgPool) -> Result<(), MigrationError> {
        for statement in Self::up_sql() {
            sqlx::query(&statement)
                .execute(pool)
                .await
                .map_err(|e| MigrationError::Database(e.to_string()))?;
        }
        tracing::info!("Split comment notification preferences into project and task flags");
        Ok(())
    }

    /// Apply the downgrade against a live database
    pub async fn downgrade(pool: &PgPool) -> Result<(), MigrationError> {
        for statement in Self::down_sql() {
            sqlx::query(&statement)
                .execute(pool)
                .await
                .map_err(|e| MigrationError::Database(e.to_string()))?;
        }
        tracing::info!("Restored single comment notification preference flag");
        Ok(())
    }

    /// Upgrade transformation over the schema model
    pub fn apply_up(schema: &TableSchema) -> Result<TableSchema, MigrationError> {
        let mut schema = schema.clone();

        schema.add_column(Column::new(PROJECTS_COLUMN, ColumnType::Boolean))?;
        schema.add_column(Column::new(TASKS_COLUMN, ColumnType::Boolean))?;
        schema.drop_column(LEGACY_COLUMN)?;
        // Backfill to false, then tighten
        schema.set_not_null(PROJECTS_COLUMN)?;
        schema.set_not_null(TASKS_COLUMN)?;

        Ok(schema)
    }

    /// Downgrade transformation over the schema model
    pub fn apply_down(schema: &TableSchema) -> Result<TableSchema, MigrationError> {
        let mut schema = schema.clone();

        schema.add_column(
            Column::new(LEGACY_COLUMN, ColumnType::Boolean)
                .not_null()
                .default_value("false"),
        )?;
        schema.drop_column(TASKS_COLUMN)?;
        schema.drop_column(PROJECTS_COLUMN)?;

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_users_table() -> TableSchema {
        TableSchema::new("users")
            .with_column(Column::new("id", ColumnType::BigInt).not_null())
            .with_column(Column::new("username", ColumnType::Varchar).not_null())
            .with_column(Column::new("email_address", ColumnType::Varchar))
            .with_column(
                Column::new(LEGACY_COLUMN, ColumnType::Boolean)
                    .not_null()
                    .default_value("false"),
            )
    }

    #[test]
    fn test_upgrade_splits_flag() {
        let upgraded = SplitCommentNotifications::apply_up(&legacy_users_table()).unwrap();

        assert!(!upgraded.has_column(LEGACY_COLUMN));

        let projects = upgraded.column(PROJECTS_COLUMN).unwrap();
        assert_eq!(projects.column_type, ColumnType::Boolean);
        assert!(!projects.nullable);

        let tasks = upgraded.column(TASKS_COLUMN).unwrap();
        assert_eq!(tasks.column_type, ColumnType::Boolean);
        assert!(!tasks.nullable);
    }

    #[test]
    fn test_round_trip_restores_legacy_schema() {
        let original = legacy_users_table();

        let upgraded = SplitCommentNotifications::apply_up(&original).unwrap();
        let downgraded = SplitCommentNotifications::apply_down(&upgraded).unwrap();

        // Exactly one legacy boolean column, no new columns, no type drift
        assert!(!downgraded.has_column(PROJECTS_COLUMN));
        assert!(!downgraded.has_column(TASKS_COLUMN));

        let legacy = downgraded.column(LEGACY_COLUMN).unwrap();
        let expected = original.column(LEGACY_COLUMN).unwrap();
        assert_eq!(legacy, expected);

        assert_eq!(downgraded.columns.len(), original.columns.len());
    }

    #[test]
    fn test_upgrade_twice_fails() {
        let upgraded = SplitCommentNotifications::apply_up(&legacy_users_table()).unwrap();
        let err = SplitCommentNotifications::apply_up(&upgraded).unwrap_err();
        assert!(matches!(err, MigrationError::ColumnExists(_)));
    }

    #[test]
    fn test_up_sql_backfills_before_not_null() {
        let statements = SplitCommentNotifications::up_sql();

        let backfill = statements
            .iter()
            .position(|s| s.contains("UPDATE users SET projects_comments_notifications"))
            .unwrap();
        let tighten = statements
            .iter()
            .position(|s| s.contains("projects_comments_notifications SET NOT NULL"))
            .unwrap();

        assert!(backfill < tighten);
    }
}
