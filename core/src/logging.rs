use std::sync::Once;

use anyhow::{anyhow, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::TrackerConfig;

const LOG_FILE: &str = "tracker.log";

/// Initialize tracing with console output on stderr and file logging to
/// `{data_dir}/logs/tracker.log`. Stdout is left to command output.
///
/// Only the first call in a process installs anything; later calls return `Ok`.
pub fn init(config: &TrackerConfig) -> Result<()> {
	static INIT: Once = Once::new();
	let mut result = Ok(());

	INIT.call_once(|| {
		let logs_dir = config.logs_dir();
		if let Err(e) = std::fs::create_dir_all(&logs_dir) {
			result = Err(anyhow!("Failed to create logs directory: {e}"));
			return;
		}

		let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, LOG_FILE);

		if let Err(e) = tracing_subscriber::registry()
			.with(
				EnvFilter::try_from_default_env()
					.unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
			)
			.with(
				fmt::layer()
					.with_target(true)
					.with_writer(std::io::stderr),
			)
			.with(
				fmt::layer()
					.with_target(true)
					.with_thread_ids(true)
					.with_ansi(false)
					.with_writer(file_appender),
			)
			.try_init()
		{
			result = Err(anyhow!("Failed to initialize tracing: {e}"));
		}
	});

	result
}
