use std::{fs, sync::Arc};

use tracker_metadata::{MetadataClient, ServiceLocator};

use crate::{Result, TagAggregator, TagStore, TrackerConfig};

/// Everything a tag operation needs, opened once per process.
pub struct Tracker {
	config: TrackerConfig,
	store: TagStore,
	locator: Arc<ServiceLocator>,
}

impl Tracker {
	/// Opens the tag store under the configured data directory and builds the
	/// service locator from the same configuration.
	pub fn open(config: TrackerConfig) -> Result<Self> {
		let locator = Arc::new(ServiceLocator::new(config.locator_settings())?);
		Self::with_locator(config, locator)
	}

	pub fn with_locator(config: TrackerConfig, locator: Arc<ServiceLocator>) -> Result<Self> {
		fs::create_dir_all(&config.data_dir)?;
		let store = TagStore::open(config.store_path())?;

		Ok(Self {
			config,
			store,
			locator,
		})
	}

	pub fn config(&self) -> &TrackerConfig {
		&self.config
	}

	pub fn store(&self) -> &TagStore {
		&self.store
	}

	pub fn locator(&self) -> &Arc<ServiceLocator> {
		&self.locator
	}

	/// A metadata client for a caller that sent `host_header`.
	pub async fn client(&self, host_header: Option<&str>) -> Result<MetadataClient> {
		Ok(self.locator.locate(host_header).await?)
	}

	pub fn aggregator<'a>(&'a self, client: &'a MetadataClient) -> TagAggregator<'a> {
		TagAggregator::new(&self.store, client)
	}
}
