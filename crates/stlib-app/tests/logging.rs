use std::fs;

use anyhow::Result;
use stlib_app::{AppState, BootstrapDependencies, bootstrap};
use stlib_data::catalog;
use stlib_telemetry::{LOG_FILE_NAME, LogFormat, LoggingConfig, init_logging};
use stlib_test_support::DataDir;

// The subscriber is process-global, so both log locations are checked in one
// test.
#[tokio::test]
async fn enabled_file_logging_attaches_during_bootstrap() -> Result<()> {
    let handle = init_logging(&LoggingConfig {
        level: "info",
        format: LogFormat::Pretty,
        build_sha: "test",
    })?;

    let dir = DataDir::new()?;
    dir.write_settings("[core.log]\nenable_file = true\n")?;
    let log_dir = dir.root().join("custom-logs");
    let log_path = log_dir.display().to_string();
    let deps = BootstrapDependencies::new(dir.env(&[("LOG_PATH", &log_path)]), catalog());

    let AppState { config, database } = bootstrap(deps, Some(&handle)).await?;
    assert_eq!(config.current().core.log.path, log_path);
    let log_file = log_dir.join(LOG_FILE_NAME);
    assert!(log_file.exists());
    tracing::warn!(marker = "custom-log-dir", "bootstrap finished");
    assert!(fs::read_to_string(&log_file)?.contains("custom-log-dir"));
    database.close().await;

    let fallback = DataDir::new()?;
    fallback.write_settings("[core.log]\nenable_file = true\n")?;
    let deps = BootstrapDependencies::new(fallback.env(&[]), catalog());
    let AppState { database, .. } = bootstrap(deps, Some(&handle)).await?;
    assert!(fallback.path().join("logs").join(LOG_FILE_NAME).exists());
    database.close().await;

    let disabled = DataDir::new()?;
    let deps = BootstrapDependencies::new(disabled.env(&[]), catalog());
    let AppState { database, .. } = bootstrap(deps, Some(&handle)).await?;
    assert!(!disabled.path().join("logs").exists());
    database.close().await;
    Ok(())
}
