//! Process-wide logging setup

use std::fs;

use tracker_core::{logging, TrackerConfig};

#[test]
fn init_writes_the_log_file_and_runs_once() {
	let dir = tempfile::tempdir().unwrap();
	let config = TrackerConfig::default_with_dir(dir.path().to_path_buf());

	logging::init(&config).unwrap();
	tracing::warn!(marker = "first-init", "Logging is up");

	// A second directory is never touched once logging is installed.
	let other = tempfile::tempdir().unwrap();
	logging::init(&TrackerConfig::default_with_dir(other.path().to_path_buf())).unwrap();
	assert!(!other.path().join("logs").exists());

	let logs = fs::read_dir(config.logs_dir())
		.unwrap()
		.map(|entry| entry.unwrap().path())
		.filter(|path| {
			path.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(|name| name.starts_with("tracker.log"))
		})
		.collect::<Vec<_>>();
	assert_eq!(logs.len(), 1);

	let written = fs::read_to_string(&logs[0]).unwrap();
	assert!(written.contains("first-init"));
	assert!(!written.contains("\x1b["));
}
