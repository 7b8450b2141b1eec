use std::sync::Arc;

use reqwest::{header::AUTHORIZATION, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info};
use tracker_discovery::{RandomEndpointStrategy, PICK_TIMEOUT};
use url::Url;

use crate::{
	config::{namespaced_url, DEFAULT_API_VERSION},
	AuthenticationRequired, ClientConfig, Error, Result,
};

/// Which way requests reach the metadata service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	Gateway,
	Discovery,
}

/// How a [`MetadataClient`](crate::MetadataClient) reaches the metadata service.
///
/// Chosen once when the client is located; callers only ever see
/// [`resolve`](Route::resolve) and [`execute`](Route::execute).
#[derive(Clone)]
pub enum Route {
	Gateway(GatewayRoute),
	Discovery(Arc<DiscoveryRoute>),
}

impl Route {
	pub fn mode(&self) -> Mode {
		match self {
			Self::Gateway(_) => Mode::Gateway,
			Self::Discovery(_) => Mode::Discovery,
		}
	}

	/// Absolute URL of the path made of `segments` inside `namespace`.
	pub async fn resolve(&self, namespace: &str, segments: &[&str]) -> Result<Url> {
		match self {
			Self::Gateway(gateway) => gateway.config.resolve_namespaced_url(namespace, segments),
			Self::Discovery(discovery) => discovery.resolve(namespace, segments).await,
		}
	}

	/// Sends a request and maps error statuses to [`Error`]s.
	pub async fn execute<B: Serialize + ?Sized>(
		&self,
		method: Method,
		url: Url,
		body: Option<&B>,
	) -> Result<Response> {
		debug!(%method, %url, mode = ?self.mode(), "Sending metadata request");

		let mut request = match self {
			Self::Gateway(gateway) => {
				let request = gateway.http.request(method, url);
				match &gateway.config.access_token {
					Some(token) => request.header(AUTHORIZATION, token.header_value()),
					None => request,
				}
			}
			Self::Discovery(discovery) => discovery.http.request(method, url),
		};

		if let Some(body) = body {
			request = request.json(body);
		}

		check_status(request.send().await?).await
	}
}

/// Requests through the gateway, authenticated with the configured token.
#[derive(Clone)]
pub struct GatewayRoute {
	config: ClientConfig,
	http: reqwest::Client,
}

impl GatewayRoute {
	pub fn new(config: ClientConfig, http: reqwest::Client) -> Self {
		Self { config, http }
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}
}

/// Plain HTTP straight to a discovered metadata service instance.
pub struct DiscoveryRoute {
	endpoint: RandomEndpointStrategy,
	http: reqwest::Client,
}

impl DiscoveryRoute {
	pub fn new(endpoint: RandomEndpointStrategy, http: reqwest::Client) -> Self {
		Self { endpoint, http }
	}

	pub fn service(&self) -> &str {
		self.endpoint.service()
	}

	/// Picks a live instance, waiting at most [`PICK_TIMEOUT`].
	pub async fn address(&self) -> Result<(String, u16)> {
		let picked = self
			.endpoint
			.pick(PICK_TIMEOUT)
			.await
			.ok_or_else(|| Error::ServiceUnavailable(self.endpoint.service().to_string()))?;

		Ok((picked.hostname, picked.port))
	}

	pub async fn resolve(&self, namespace: &str, segments: &[&str]) -> Result<Url> {
		let (host, port) = self.address().await?;
		let base = Url::parse(&format!("http://{host}:{port}"))?;

		Ok(namespaced_url(base, DEFAULT_API_VERSION, namespace, segments))
	}
}

/// Outcome of a gateway liveness probe that did not demand credentials.
#[derive(Debug)]
pub enum GatewayProbe {
	Reachable,
	Unreachable(Error),
}

/// `GET /ping` against the gateway described by `config`.
///
/// Only an authentication demand is an `Err`: every other failure still leaves
/// the gateway as the route, just with different connection settings.
pub async fn probe_gateway(
	http: &reqwest::Client,
	config: &ClientConfig,
) -> std::result::Result<GatewayProbe, AuthenticationRequired> {
	let url = match config.resolve_url("ping") {
		Ok(url) => url,
		Err(e) => return Ok(GatewayProbe::Unreachable(e)),
	};

	let mut request = http.get(url);
	if let Some(token) = &config.access_token {
		request = request.header(AUTHORIZATION, token.header_value());
	}

	let response = match request.send().await {
		Ok(response) => response,
		Err(e) => return Ok(GatewayProbe::Unreachable(e.into())),
	};

	match check_status(response).await {
		Ok(_) => {
			info!(gateway = %config.connection.base_url(), "Gateway is reachable");
			Ok(GatewayProbe::Reachable)
		}
		Err(Error::AuthenticationRequired) => Err(AuthenticationRequired),
		Err(e) => Ok(GatewayProbe::Unreachable(e)),
	}
}

pub(crate) async fn check_status(response: Response) -> Result<Response> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();

	Err(match status {
		StatusCode::BAD_REQUEST => Error::BadRequest(body),
		StatusCode::UNAUTHORIZED => Error::AuthenticationRequired,
		StatusCode::FORBIDDEN => Error::Unauthorized(body),
		StatusCode::NOT_FOUND => Error::NotFound(body),
		_ => Error::UnexpectedStatus {
			status: status.as_u16(),
			body,
		},
	})
}
