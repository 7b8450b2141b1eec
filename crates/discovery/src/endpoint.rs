use std::{sync::Arc, time::Duration};

use rand::seq::SliceRandom;
use tokio::time::{sleep, timeout};
use tracing::{trace, warn};

use crate::{Discoverable, DiscoveryClient};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Picks a uniformly random live instance of one service.
pub struct RandomEndpointStrategy {
	discovery: Arc<DiscoveryClient>,
	service: String,
}

impl RandomEndpointStrategy {
	pub(crate) fn new(discovery: Arc<DiscoveryClient>, service: String) -> Self {
		Self { discovery, service }
	}

	pub fn service(&self) -> &str {
		&self.service
	}

	/// Waits up to `wait` for at least one instance to be registered.
	///
	/// Returns `None` when nothing showed up in time. Read failures are logged
	/// and treated as "no instance yet".
	pub async fn pick(&self, wait: Duration) -> Option<Discoverable> {
		timeout(wait, async {
			loop {
				match self.discovery.instances(&self.service).await {
					Ok(instances) => {
						let picked = instances.choose(&mut rand::thread_rng()).cloned();
						if let Some(picked) = picked {
							return picked;
						}
						trace!(service = %self.service, "No live instance registered yet");
					}
					Err(e) => warn!(service = %self.service, "Failed to list instances: {e}"),
				}

				sleep(POLL_INTERVAL).await;
			}
		})
		.await
		.ok()
	}
}
