//! Ordered schema initialization against an open handle.
//!
//! Initializers run strictly in the order given; each may depend on tables
//! created by the ones before it. The first failure stops the sequence.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{DataError, Result};
use crate::pool::Database;

/// One step of schema setup.
#[async_trait]
pub trait SchemaInitializer: Send + Sync {
    /// Identifier reported when the step fails.
    fn name(&self) -> &'static str;
    /// Create or upgrade the tables owned by this step.
    async fn initialize(&self, database: &Database) -> Result<()>;
}

/// Initializer that runs a fixed list of idempotent DDL statements.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    name: &'static str,
    statements: &'static [&'static str],
}

impl TableSchema {
    /// Build an initializer from portable DDL.
    #[must_use]
    pub const fn new(name: &'static str, statements: &'static [&'static str]) -> Self {
        Self { name, statements }
    }

    /// Statements executed, in order.
    #[must_use]
    pub const fn statements(&self) -> &'static [&'static str] {
        self.statements
    }
}

#[async_trait]
impl SchemaInitializer for TableSchema {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self, database: &Database) -> Result<()> {
        for statement in self.statements {
            database.execute("schema.initialize", statement).await?;
        }
        Ok(())
    }
}

/// Tag vocabulary.
pub const TAGS: TableSchema = TableSchema::new(
    "tags",
    &["CREATE TABLE IF NOT EXISTS tags (value TEXT PRIMARY KEY)"],
);

/// Projects and their tag links; requires `tags`.
pub const PROJECTS: TableSchema = TableSchema::new(
    "projects",
    &[
        "CREATE TABLE IF NOT EXISTS projects (\
            uuid TEXT PRIMARY KEY, \
            name TEXT NOT NULL, \
            path TEXT NOT NULL, \
            description TEXT NOT NULL DEFAULT '', \
            initialized BOOLEAN NOT NULL DEFAULT FALSE)",
        "CREATE TABLE IF NOT EXISTS project_tags (\
            project_uuid TEXT NOT NULL REFERENCES projects(uuid) ON DELETE CASCADE, \
            tag_value TEXT NOT NULL REFERENCES tags(value) ON DELETE CASCADE, \
            PRIMARY KEY (project_uuid, tag_value))",
    ],
);

/// Files belonging to projects; requires `projects`.
pub const ASSETS: TableSchema = TableSchema::new(
    "assets",
    &[
        "CREATE TABLE IF NOT EXISTS assets (\
            id TEXT PRIMARY KEY, \
            project_uuid TEXT NOT NULL REFERENCES projects(uuid) ON DELETE CASCADE, \
            name TEXT NOT NULL, \
            extension TEXT NOT NULL DEFAULT '', \
            size BIGINT NOT NULL DEFAULT 0)",
        "CREATE INDEX IF NOT EXISTS idx_assets_project_uuid ON assets (project_uuid)",
    ],
);

/// Library catalog initializers in dependency order: tags, projects, assets.
#[must_use]
pub fn catalog() -> Vec<Box<dyn SchemaInitializer>> {
    vec![Box::new(TAGS), Box::new(PROJECTS), Box::new(ASSETS)]
}

/// Run `initializers` in order against an open handle.
///
/// # Errors
///
/// Returns [`DataError::SchemaInit`] naming the first initializer that failed;
/// later initializers are not attempted.
pub async fn initialize_schema(
    database: &Database,
    initializers: &[Box<dyn SchemaInitializer>],
) -> Result<()> {
    for initializer in initializers {
        debug!(initializer = initializer.name(), "initializing schema");
        initializer
            .initialize(database)
            .await
            .map_err(|source| DataError::SchemaInit {
                initializer: initializer.name(),
                source: Box::new(source),
            })?;
    }
    info!(count = initializers.len(), "schema initialized");
    Ok(())
}
