use std::fs;

use stlib_telemetry::{LOG_FILE_NAME, LogFormat, LoggingConfig, TelemetryError, init_logging};

// The subscriber is process-global, so every assertion lives in one test.
#[test]
fn file_sink_attaches_after_console_install() {
    let config = LoggingConfig {
        level: "info",
        format: LogFormat::Pretty,
        build_sha: "test",
    };
    let handle = init_logging(&config).expect("install subscriber");
    assert_eq!(stlib_telemetry::build_sha(), "test");

    let second = init_logging(&config).unwrap_err();
    assert!(matches!(second, TelemetryError::SubscriberInstall { .. }));

    let temp = tempfile::tempdir().expect("tempdir");
    let directory = temp.path().join("nested").join("logs");
    let path = handle.attach_log_file(&directory).expect("attach");
    assert_eq!(path, directory.join(LOG_FILE_NAME));

    tracing::warn!(marker = "file-sink-check", "written after attach");
    let contents = fs::read_to_string(&path).expect("read log");
    assert!(contents.contains("file-sink-check"), "{contents}");
    assert!(!contents.contains('\u{1b}'), "file output must not carry ansi codes");

    let blocked = temp.path().join("not-a-dir");
    fs::write(&blocked, "x").expect("write blocker");
    let err = handle.attach_log_file(&blocked).unwrap_err();
    assert!(matches!(err, TelemetryError::LogFileCreate { .. }));
}
