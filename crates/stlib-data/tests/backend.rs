use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use stlib_config::{Config, ConfigStore};
use stlib_data::{
    BackendKind, DataError, Database, DatabaseTarget, DbErrorKind, SchemaInitializer, catalog,
    initialize_schema,
};
use stlib_test_support::{DataDir, external_postgres};

async fn open_sqlite(dir: &DataDir) -> Result<Database> {
    let store = ConfigStore::resolve(&dir.env(&[]))?;
    let database = Database::open(&store.current().database, store.data_path())
        .await
        .context("failed to open sqlite")?;
    Ok(database)
}

#[tokio::test]
async fn sqlite_database_lives_in_the_data_directory() -> Result<()> {
    let dir = DataDir::new()?;
    let database = open_sqlite(&dir).await?;
    assert_eq!(database.kind(), BackendKind::Sqlite);
    assert!(dir.path().join("data.db").exists());
    database.ping().await?;
    database.close().await;
    Ok(())
}

#[tokio::test]
async fn catalog_initialization_is_repeatable() -> Result<()> {
    let dir = DataDir::new()?;
    let database = open_sqlite(&dir).await?;
    initialize_schema(&database, &catalog()).await?;
    initialize_schema(&database, &catalog()).await?;

    database
        .execute("test.insert_project", "INSERT INTO projects (uuid, name, path) VALUES ('p1', 'Benchy', '/library/benchy')")
        .await?;
    database
        .execute("test.insert_asset", "INSERT INTO assets (id, project_uuid, name) VALUES ('a1', 'p1', 'benchy.stl')")
        .await?;
    database.close().await;
    Ok(())
}

#[tokio::test]
async fn driver_errors_are_translated() -> Result<()> {
    let dir = DataDir::new()?;
    let database = open_sqlite(&dir).await?;
    initialize_schema(&database, &catalog()).await?;

    database
        .execute("test.insert_tag", "INSERT INTO tags (value) VALUES ('boat')")
        .await?;
    let duplicate = database
        .execute("test.insert_tag", "INSERT INTO tags (value) VALUES ('boat')")
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), Some(DbErrorKind::UniqueViolation));

    let orphan = database
        .execute(
            "test.insert_asset",
            "INSERT INTO assets (id, project_uuid, name) VALUES ('a1', 'missing', 'x.stl')",
        )
        .await
        .unwrap_err();
    assert_eq!(orphan.kind(), Some(DbErrorKind::ForeignKeyViolation));

    let null = database
        .execute(
            "test.insert_project",
            "INSERT INTO projects (uuid, name, path) VALUES ('p1', NULL, '/x')",
        )
        .await
        .unwrap_err();
    assert_eq!(null.kind(), Some(DbErrorKind::NotNullViolation));
    database.close().await;
    Ok(())
}

struct Failing;

#[async_trait]
impl SchemaInitializer for Failing {
    fn name(&self) -> &'static str {
        "projects"
    }

    async fn initialize(&self, database: &Database) -> stlib_data::DataResult<()> {
        database
            .execute("test.broken", "CREATE TABLE broken (")
            .await
            .map(|_| ())
    }
}

struct Recording(Arc<AtomicBool>);

#[async_trait]
impl SchemaInitializer for Recording {
    fn name(&self) -> &'static str {
        "assets"
    }

    async fn initialize(&self, _database: &Database) -> stlib_data::DataResult<()> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn first_failing_initializer_stops_the_sequence() -> Result<()> {
    let dir = DataDir::new()?;
    let database = open_sqlite(&dir).await?;
    let ran = Arc::new(AtomicBool::new(false));
    let steps: Vec<Box<dyn SchemaInitializer>> = vec![
        Box::new(stlib_data::schema::TAGS),
        Box::new(Failing),
        Box::new(Recording(Arc::clone(&ran))),
    ];

    let err = initialize_schema(&database, &steps).await.unwrap_err();
    assert!(matches!(err, DataError::SchemaInit { initializer: "projects", .. }));
    assert!(!ran.load(Ordering::SeqCst));
    database.close().await;
    Ok(())
}

#[tokio::test]
async fn unsupported_backend_never_connects() -> Result<()> {
    let dir = DataDir::new()?;
    let store = ConfigStore::resolve(&dir.env(&[("DATABASE_TYPE", "unsupported-value")]))?;
    assert_eq!(store.current().database.kind, "unsupported-value");

    let err = Database::open(&store.current().database, store.data_path())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::UnsupportedBackend { ref value } if value == "unsupported-value"));
    assert!(!dir.path().join("data.db").exists());
    Ok(())
}

#[tokio::test]
async fn sqlite_connect_failure_is_wrapped() -> Result<()> {
    let dir = DataDir::new()?;
    let missing = dir.root().join("not-created");
    let err = Database::open(&Config::default().database, &missing)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Connect { backend: BackendKind::Sqlite, .. }));
    assert!(std::error::Error::source(&err).is_some());
    Ok(())
}

#[tokio::test]
async fn postgres_env_selects_postgres_without_touching_sqlite() -> Result<()> {
    let dir = DataDir::new()?;
    let store = ConfigStore::resolve(&dir.env(&[
        ("DATABASE_TYPE", "postgres"),
        ("POSTGRES_HOST", "db1"),
        ("POSTGRES_PORT", "5433"),
        ("POSTGRES_USER", "svc"),
    ]))?;
    let target = DatabaseTarget::select(&store.current().database, store.data_path())?;
    let DatabaseTarget::Postgres(pg) = &target else {
        anyhow::bail!("expected postgres target, got {target:?}");
    };
    assert_eq!(pg.host, "db1");
    assert_eq!(pg.port, 5433);
    assert_eq!(pg.user, "svc");
    assert_eq!(pg.sslmode, "disable");
    assert!(!dir.path().join("data.db").exists());
    Ok(())
}

#[tokio::test]
async fn postgres_catalog_initializes_against_external_server() -> Result<()> {
    let Some(postgres) = external_postgres()? else {
        eprintln!("skipping postgres_catalog_initializes_against_external_server: STLIB_TEST_DATABASE_URL unset");
        return Ok(());
    };
    let dir = DataDir::new()?;
    let pairs = postgres.env_pairs();
    let env: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let store = ConfigStore::resolve(&dir.env(&env))?;

    let database = Database::open(&store.current().database, store.data_path()).await?;
    assert_eq!(database.kind(), BackendKind::Postgres);
    initialize_schema(&database, &catalog()).await?;
    database.ping().await?;
    assert!(!dir.path().join("data.db").exists());
    database.close().await;
    Ok(())
}

// The process-wide slot can be filled once per test binary; no other test here
// publishes.
#[tokio::test]
async fn published_handle_is_shared_and_single_shot() -> Result<()> {
    let dir = DataDir::new()?;
    let database = open_sqlite(&dir).await?;
    assert!(stlib_data::global().is_none());

    let published = stlib_data::publish(database.clone())?;
    assert_eq!(published.kind(), BackendKind::Sqlite);
    let shared = stlib_data::global().context("handle should be published")?;
    assert_eq!(shared.kind(), database.kind());
    shared.ping().await?;

    let other_dir = DataDir::new()?;
    let second = open_sqlite(&other_dir).await?;
    let err = stlib_data::publish(second.clone()).unwrap_err();
    assert!(matches!(err, DataError::AlreadyPublished));
    second.close().await;
    database.close().await;
    Ok(())
}
