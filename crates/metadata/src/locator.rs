use std::{sync::Arc, time::Duration};

use tokio::sync::OnceCell;
use tracing::{debug, info};
use tracker_discovery::{Connector, DiscoveryClient, ZkConnector, DEFAULT_DISCOVERY_ROOT};

use crate::{
	config::DEFAULT_API_VERSION, probe_gateway, AccessToken, AuthenticationRequired, ClientConfig,
	ConnectionConfig, DiscoveryRoute, Error, GatewayProbe, GatewayRoute, MetadataClient, Result,
	Route,
};

/// Name the metadata service registers under.
pub const DEFAULT_METADATA_SERVICE: &str = "metadata.service";

#[derive(Debug, Clone)]
pub struct LocatorSettings {
	/// Coordination service connect string, `host:port[,host:port...][/chroot]`.
	pub zookeeper_quorum: Option<String>,
	pub discovery_root: String,
	pub metadata_service: String,
	pub access_token: Option<AccessToken>,
	pub ssl_enabled: bool,
	pub api_version: String,
	pub http_timeout: Duration,
}

impl Default for LocatorSettings {
	fn default() -> Self {
		Self {
			zookeeper_quorum: None,
			discovery_root: DEFAULT_DISCOVERY_ROOT.to_string(),
			metadata_service: DEFAULT_METADATA_SERVICE.to_string(),
			access_token: None,
			ssl_enabled: false,
			api_version: DEFAULT_API_VERSION.to_string(),
			http_timeout: Duration::from_secs(30),
		}
	}
}

/// Hands out [`MetadataClient`]s routed through the gateway or through discovery.
///
/// Build one per process and share it. The discovery route is expensive to set
/// up (it holds a coordination-service session), so it is created the first time
/// the gateway demands credentials and reused for the rest of the process.
pub struct ServiceLocator {
	settings: LocatorSettings,
	http: reqwest::Client,
	connector: Arc<dyn Connector>,
	discovery: OnceCell<Arc<DiscoveryRoute>>,
}

impl ServiceLocator {
	pub fn new(settings: LocatorSettings) -> Result<Self> {
		Self::with_connector(settings, Arc::new(ZkConnector))
	}

	pub fn with_connector(settings: LocatorSettings, connector: Arc<dyn Connector>) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(settings.http_timeout)
			.build()?;

		Ok(Self {
			settings,
			http,
			connector,
			discovery: OnceCell::new(),
		})
	}

	pub fn settings(&self) -> &LocatorSettings {
		&self.settings
	}

	/// Gateway settings for a request that arrived with `host_header`.
	pub fn gateway_config(&self, host_header: Option<&str>) -> Result<ClientConfig> {
		let connection = match host_header {
			Some(header) => ConnectionConfig::from_host_header(header, self.settings.ssl_enabled)?,
			None => ConnectionConfig {
				ssl_enabled: self.settings.ssl_enabled,
				..Default::default()
			},
		};

		Ok(ClientConfig::new(connection)
			.with_api_version(self.settings.api_version.clone())
			.with_access_token(self.settings.access_token.clone()))
	}

	/// Probes the gateway named by `host_header` and picks a route.
	///
	/// * gateway answers: gateway route with that address;
	/// * gateway fails for any other reason: gateway route with the default address;
	/// * gateway demands authentication: the shared discovery route.
	pub async fn locate(&self, host_header: Option<&str>) -> Result<MetadataClient> {
		let config = self.gateway_config(host_header)?;
		info!(gateway = %config.connection.base_url(), "Locating metadata service");

		let route = match probe_gateway(&self.http, &config).await {
			Ok(GatewayProbe::Reachable) => Route::Gateway(GatewayRoute::new(config, self.http.clone())),
			Ok(GatewayProbe::Unreachable(e)) => {
				let fallback = config.with_default_connection();
				debug!(
					fallback = %fallback.connection.base_url(),
					"Got error while pinging gateway, falling back to default connection: {e}"
				);
				Route::Gateway(GatewayRoute::new(fallback, self.http.clone()))
			}
			Err(AuthenticationRequired) => {
				debug!("Gateway requires authentication, falling back to service discovery");
				Route::Discovery(self.discovery_route().await?)
			}
		};

		Ok(MetadataClient::new(route))
	}

	/// The process-wide discovery route, created on first use.
	///
	/// Concurrent first callers wait on a single construction and all get the
	/// same route. A failed construction leaves the cell empty.
	pub async fn discovery_route(&self) -> Result<Arc<DiscoveryRoute>> {
		self.discovery
			.get_or_try_init(|| async {
				let quorum = self
					.settings
					.zookeeper_quorum
					.as_deref()
					.ok_or(Error::MissingQuorum)?;
				info!(%quorum, "Using service discovery");

				let coordinator = self.connector.connect(quorum).await?;
				let discovery = Arc::new(DiscoveryClient::new(
					coordinator,
					self.settings.discovery_root.clone(),
				));

				Ok::<_, Error>(Arc::new(DiscoveryRoute::new(
					discovery.discover(self.settings.metadata_service.clone()),
					self.http.clone(),
				)))
			})
			.await
			.map(Arc::clone)
	}

	/// Whether the discovery route has been created yet.
	pub fn is_discovery_initialized(&self) -> bool {
		self.discovery.initialized()
	}
}
