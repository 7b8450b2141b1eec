use std::{
	collections::HashMap,
	sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::{endpoint::RandomEndpointStrategy, Result, INSTANCE_TTL};

/// The narrow slice of a coordination service that discovery needs.
///
/// Paths are absolute, `/`-separated node paths. A path that does not exist is
/// not an error: `children` returns an empty list and `data` returns `None`.
#[async_trait]
pub trait Coordinator: Send + Sync {
	async fn children(&self, path: &str) -> Result<Vec<String>>;

	async fn data(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Builds a started [`Coordinator`] from a quorum connect string.
#[async_trait]
pub trait Connector: Send + Sync {
	async fn connect(&self, quorum: &str) -> Result<Arc<dyn Coordinator>>;
}

/// A live service instance as registered in the coordination service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discoverable {
	pub service: String,
	pub hostname: String,
	pub port: u16,
}

/// Reads service registrations below a discovery root.
///
/// A non-empty instance list is reused for [`INSTANCE_TTL`] before the
/// coordination service is read again.
pub struct DiscoveryClient {
	coordinator: Arc<dyn Coordinator>,
	root: String,
	cache: Mutex<HashMap<String, (Instant, Vec<Discoverable>)>>,
}

impl DiscoveryClient {
	pub fn new(coordinator: Arc<dyn Coordinator>, root: impl Into<String>) -> Self {
		Self {
			coordinator,
			root: root.into(),
			cache: Mutex::default(),
		}
	}

	fn service_path(&self, service: &str) -> String {
		format!("{}/{}", self.root.trim_end_matches('/'), service)
	}

	/// Every instance of `service` currently registered, as of at most
	/// [`INSTANCE_TTL`] ago.
	///
	/// Nodes that vanish between listing and reading are ignored, as are nodes
	/// whose payload does not decode or names another service.
	pub async fn instances(&self, service: &str) -> Result<Vec<Discoverable>> {
		if let Some(instances) = self.cached(service) {
			trace!(%service, "Using cached instances");
			return Ok(instances);
		}

		let instances = self.read_instances(service).await?;
		if !instances.is_empty() {
			self.cache
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.insert(service.to_string(), (Instant::now(), instances.clone()));
		}

		Ok(instances)
	}

	fn cached(&self, service: &str) -> Option<Vec<Discoverable>> {
		let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
		let fresh = cache
			.get(service)
			.filter(|(read_at, _)| read_at.elapsed() < INSTANCE_TTL)
			.map(|(_, instances)| instances.clone());

		fresh
	}

	async fn read_instances(&self, service: &str) -> Result<Vec<Discoverable>> {
		let path = self.service_path(service);
		let children = self.coordinator.children(&path).await?;

		let mut instances = Vec::with_capacity(children.len());
		for child in children {
			let node = format!("{path}/{child}");
			let Some(payload) = self.coordinator.data(&node).await? else {
				debug!(%node, "Discovery node vanished before it could be read");
				continue;
			};

			match serde_json::from_slice::<Discoverable>(&payload) {
				Ok(discoverable) if discoverable.service == service => instances.push(discoverable),
				Ok(discoverable) => warn!(
					%node,
					registered = %discoverable.service,
					"Skipping discovery node registered for another service"
				),
				Err(e) => warn!(%node, "Skipping undecodable discovery node: {e}"),
			}
		}

		Ok(instances)
	}

	/// An endpoint strategy that picks random live instances of `service`.
	pub fn discover(self: &Arc<Self>, service: impl Into<String>) -> RandomEndpointStrategy {
		RandomEndpointStrategy::new(Arc::clone(self), service.into())
	}
}
