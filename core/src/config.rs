//! Tracker configuration

use std::{
	fs,
	path::{Path, PathBuf},
	time::Duration,
};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracker_metadata::{config::DEFAULT_API_VERSION, AccessToken, LocatorSettings};

const CONFIG_FILE: &str = "tracker.json";
const STORE_FILE: &str = "tags.redb";
const CONFIG_VERSION: u32 = 1;

pub const DATA_DIR_ENV: &str = "TRACKER_DATA_DIR";
pub const ZOOKEEPER_QUORUM_ENV: &str = "TRACKER_ZOOKEEPER_QUORUM";

/// Main tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
	/// Config schema version
	pub version: u32,

	/// Where the tag store and logs live
	pub data_dir: PathBuf,

	/// Default log filter when `RUST_LOG` is unset
	pub log_level: String,

	/// Coordination service connect string
	#[serde(default)]
	pub zookeeper_quorum: Option<String>,

	#[serde(default)]
	pub discovery: DiscoveryConfig,

	#[serde(default)]
	pub gateway: GatewayConfig,

	/// Timeout for every metadata request
	#[serde(default = "default_http_timeout_secs")]
	pub http_timeout_secs: u64,
}

/// Where metadata service instances register themselves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
	pub root: String,
	pub service: String,
}

impl Default for DiscoveryConfig {
	fn default() -> Self {
		let settings = LocatorSettings::default();
		Self {
			root: settings.discovery_root,
			service: settings.metadata_service,
		}
	}
}

/// How to talk to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
	pub access_token: Option<AccessToken>,
	pub ssl_enabled: bool,
	pub api_version: String,
}

impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			access_token: None,
			ssl_enabled: false,
			api_version: DEFAULT_API_VERSION.to_string(),
		}
	}
}

fn default_http_timeout_secs() -> u64 {
	30
}

impl TrackerConfig {
	/// Load configuration from a specific data directory, creating a default
	/// one if none exists yet
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE);

		let mut config = if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let config: TrackerConfig = serde_json::from_str(&json)?;

			if config.version > CONFIG_VERSION {
				warn!(
					"Config version v{} is newer than supported v{}",
					config.version, CONFIG_VERSION
				);
			}

			config
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			config
		};

		config.override_quorum(std::env::var(ZOOKEEPER_QUORUM_ENV).ok());

		Ok(config)
	}

	/// Load or create configuration, replacing an unreadable file with defaults
	pub fn load_or_create(data_dir: &Path) -> Result<Self> {
		Self::load_from(data_dir).or_else(|e| {
			warn!("Failed to load config, recreating defaults: {e:#}");
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		})
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: CONFIG_VERSION,
			data_dir,
			log_level: "info".to_string(),
			zookeeper_quorum: None,
			discovery: DiscoveryConfig::default(),
			gateway: GatewayConfig::default(),
			http_timeout_secs: default_http_timeout_secs(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.data_dir.join(CONFIG_FILE);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	fn override_quorum(&mut self, quorum: Option<String>) {
		if let Some(quorum) = quorum.filter(|q| !q.trim().is_empty()) {
			info!(%quorum, "Using coordination quorum from {ZOOKEEPER_QUORUM_ENV}");
			self.zookeeper_quorum = Some(quorum);
		}
	}

	pub fn logs_dir(&self) -> PathBuf {
		self.data_dir.join("logs")
	}

	pub fn store_path(&self) -> PathBuf {
		self.data_dir.join(STORE_FILE)
	}

	/// Settings for the process-wide [`tracker_metadata::ServiceLocator`].
	pub fn locator_settings(&self) -> LocatorSettings {
		LocatorSettings {
			zookeeper_quorum: self.zookeeper_quorum.clone(),
			discovery_root: self.discovery.root.clone(),
			metadata_service: self.discovery.service.clone(),
			access_token: self.gateway.access_token.clone(),
			ssl_enabled: self.gateway.ssl_enabled,
			api_version: self.gateway.api_version.clone(),
			http_timeout: Duration::from_secs(self.http_timeout_secs),
		}
	}
}

impl Default for TrackerConfig {
	fn default() -> Self {
		let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
		Self::default_with_dir(data_dir)
	}
}

/// Platform data directory for the tracker, created if missing
pub fn default_data_dir() -> Result<PathBuf> {
	#[cfg(target_os = "linux")]
	let dir = dirs::data_local_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("tracker");

	#[cfg(not(target_os = "linux"))]
	let dir = dirs::data_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("tracker");

	fs::create_dir_all(&dir)?;

	Ok(dir)
}
