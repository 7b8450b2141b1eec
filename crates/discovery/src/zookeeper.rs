use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use backoff::future::retry_notify;
use tokio::sync::RwLock;
use tracing::{info, warn};
use zookeeper_client as zk;

use crate::{retry::coordination_policy, Connector, Coordinator, Error, Result};

/// Connects [`ZkCoordinator`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZkConnector;

#[async_trait]
impl Connector for ZkConnector {
	async fn connect(&self, quorum: &str) -> Result<Arc<dyn Coordinator>> {
		Ok(Arc::new(ZkCoordinator::connect(quorum).await?))
	}
}

/// A ZooKeeper session that reconnects itself.
///
/// Connection failures and failed reads are retried with
/// [`coordination_policy`] for as long as it takes; wrap calls in a timeout if
/// the caller needs a bound.
pub struct ZkCoordinator {
	quorum: String,
	client: RwLock<zk::Client>,
}

impl ZkCoordinator {
	pub async fn connect(quorum: &str) -> Result<Self> {
		info!(%quorum, "Connecting to coordination service");
		let client = connect_with_retry(quorum).await?;

		Ok(Self {
			quorum: quorum.to_string(),
			client: RwLock::new(client),
		})
	}

	async fn reconnect(&self) {
		match zk::Client::connect(&self.quorum).await {
			Ok(client) => *self.client.write().await = client,
			Err(e) => warn!(quorum = %self.quorum, "Coordination service reconnect failed: {e}"),
		}
	}

	async fn read<T, F, Fut>(&self, path: &str, op: F) -> Result<T>
	where
		F: Fn(zk::Client) -> Fut,
		Fut: Future<Output = std::result::Result<T, zk::Error>>,
	{
		let op = &op;

		retry_notify(
			coordination_policy(),
			|| async move {
				let client = self.client.read().await.clone();
				match op(client).await {
					Ok(value) => Ok(value),
					Err(e) => {
						self.reconnect().await;
						Err(backoff::Error::transient(Error::Request {
							path: path.to_string(),
							reason: e.to_string(),
						}))
					}
				}
			},
			|e: Error, delay: Duration| warn!(?delay, "Retrying coordination read: {e}"),
		)
		.await
	}
}

#[async_trait]
impl Coordinator for ZkCoordinator {
	async fn children(&self, path: &str) -> Result<Vec<String>> {
		self.read(path, |client| async move {
			match client.list_children(path).await {
				Err(zk::Error::NoNode) => Ok(Vec::new()),
				other => other,
			}
		})
		.await
	}

	async fn data(&self, path: &str) -> Result<Option<Vec<u8>>> {
		self.read(path, |client| async move {
			match client.get_data(path).await {
				Ok((data, _stat)) => Ok(Some(data)),
				Err(zk::Error::NoNode) => Ok(None),
				Err(e) => Err(e),
			}
		})
		.await
	}
}

async fn connect_with_retry(quorum: &str) -> Result<zk::Client> {
	retry_notify(
		coordination_policy(),
		|| async move {
			zk::Client::connect(quorum).await.map_err(|e| {
				backoff::Error::transient(Error::Connect {
					quorum: quorum.to_string(),
					reason: e.to_string(),
				})
			})
		},
		|e: Error, delay: Duration| warn!(?delay, "Retrying coordination service connection: {e}"),
	)
	.await
}
