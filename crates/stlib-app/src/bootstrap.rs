use std::fmt;
use std::sync::Arc;

use stlib_config::{ConfigStore, EnvSource, ProcessEnv};
use stlib_data::{Database, SchemaInitializer, catalog, initialize_schema};
use stlib_telemetry::{LoggingConfig, LoggingHandle};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap stlib.
pub struct BootstrapDependencies<E> {
    env: E,
    initializers: Vec<Box<dyn SchemaInitializer>>,
}

impl BootstrapDependencies<ProcessEnv> {
    /// Production dependencies: the process environment and the library catalog.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ProcessEnv, catalog())
    }
}

impl<E: EnvSource> BootstrapDependencies<E> {
    /// Assemble dependencies from an explicit environment and schema sequence.
    #[must_use]
    pub fn new(env: E, initializers: Vec<Box<dyn SchemaInitializer>>) -> Self {
        Self { env, initializers }
    }
}

impl<E> fmt::Debug for BootstrapDependencies<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.initializers.iter().map(|step| step.name()).collect();
        formatter
            .debug_struct("BootstrapDependencies")
            .field("initializers", &names)
            .finish_non_exhaustive()
    }
}

/// Handles produced by a successful bootstrap.
#[derive(Debug)]
pub struct AppState {
    /// Resolved configuration.
    pub config: Arc<ConfigStore>,
    /// Open storage handle with the schema initialized.
    pub database: Database,
}

/// Resolve configuration, open the selected backend and initialize its schema.
///
/// Nothing is published process-wide; callers decide what to expose. When a
/// logging handle is supplied and the configuration enables it, the log file
/// sink is attached as soon as the configuration is known.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created, the backend is
/// unsupported or unreachable, or a schema initializer fails.
pub async fn bootstrap<E: EnvSource>(
    dependencies: BootstrapDependencies<E>,
    logging: Option<&LoggingHandle>,
) -> AppResult<AppState> {
    let BootstrapDependencies { env, initializers } = dependencies;

    let store = ConfigStore::resolve(&env)
        .map_err(|err| AppError::config("config_store.resolve", err))?;
    let config = store.current();

    if let Some(handle) = logging.filter(|_| config.core.log.enable_file) {
        let directory = config.core.log.directory(store.data_path());
        if let Err(err) = handle.attach_log_file(&directory) {
            warn!(error = %err, detail = ?err, "log file unavailable; continuing with console only");
        }
    }

    info!(
        data_path = %store.data_path().display(),
        config = %config.redacted(),
        "configuration resolved"
    );

    let database = Database::open(&config.database, store.data_path())
        .await
        .map_err(|err| AppError::data("database.open", err))?;
    if let Err(err) = initialize_schema(&database, &initializers).await {
        database.close().await;
        return Err(AppError::data("database.initialize_schema", err));
    }

    Ok(AppState {
        config: Arc::new(store),
        database,
    })
}

/// Entry point for the stlib boot sequence.
///
/// Installs logging, bootstraps, publishes the configuration and database
/// handles process-wide, then waits for Ctrl-C and closes the pool.
///
/// # Errors
///
/// Returns an error if logging cannot be installed, bootstrap fails, either
/// handle was already published, or the shutdown signal cannot be awaited.
pub async fn run_app() -> AppResult<()> {
    let logging = stlib_telemetry::init_logging(&LoggingConfig::default())
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    info!(build_sha = stlib_telemetry::build_sha(), "stlib bootstrap starting");

    let AppState { config, database } =
        bootstrap(BootstrapDependencies::from_env(), Some(&logging)).await?;
    let config = stlib_config::publish(config)
        .map_err(|err| AppError::config("config_store.publish", err))?;
    let database =
        stlib_data::publish(database).map_err(|err| AppError::data("database.publish", err))?;

    let current = config.current();
    info!(
        hostname = %current.server.hostname,
        port = current.server.port,
        backend = %database.kind(),
        "stlib ready"
    );

    let signal = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
    database.close().await;
    signal.map_err(|err| AppError::io("signal.ctrl_c", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn dependencies_debug_lists_initializers_in_order() {
        let deps = BootstrapDependencies::new(HashMap::<String, String>::new(), catalog());
        let rendered = format!("{deps:?}");
        assert!(rendered.contains(r#"["tags", "projects", "assets"]"#), "{rendered}");
    }
}
