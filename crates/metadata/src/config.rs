//! Connection settings for reaching the gateway.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PORT: u16 = 11015;
pub const DEFAULT_API_VERSION: &str = "v3";

/// Credential sent to the gateway as `Authorization: {token_type} {access_token}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	pub token_type: String,
	pub access_token: String,
}

impl AccessToken {
	pub fn header_value(&self) -> String {
		format!("{} {}", self.token_type, self.access_token)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
	pub hostname: String,
	pub port: u16,
	pub ssl_enabled: bool,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self {
			hostname: DEFAULT_HOSTNAME.to_string(),
			port: DEFAULT_PORT,
			ssl_enabled: false,
		}
	}
}

impl ConnectionConfig {
	/// Parses a `Host` header value of the form `host[:port]`.
	///
	/// A missing port means [`DEFAULT_PORT`]. Bracketed IPv6 literals are kept
	/// with their brackets so they can go straight back into a URL.
	pub fn from_host_header(header: &str, ssl_enabled: bool) -> Result<Self> {
		let header = header.trim();
		if header.is_empty() {
			return Err(Error::InvalidHostHeader(header.to_string()));
		}

		let (hostname, port) = match header.rsplit_once(':') {
			Some((host, port)) if !host.contains(':') || host.ends_with(']') => {
				let port = port
					.parse::<u16>()
					.map_err(|_| Error::InvalidHostHeader(header.to_string()))?;
				(host, port)
			}
			_ => (header, DEFAULT_PORT),
		};

		if hostname.is_empty() {
			return Err(Error::InvalidHostHeader(header.to_string()));
		}

		Ok(Self {
			hostname: hostname.to_string(),
			port,
			ssl_enabled,
		})
	}

	pub fn base_url(&self) -> String {
		let scheme = if self.ssl_enabled { "https" } else { "http" };
		format!("{scheme}://{}:{}", self.hostname, self.port)
	}
}

/// Everything needed to talk to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	pub connection: ConnectionConfig,
	pub api_version: String,
	pub access_token: Option<AccessToken>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			connection: ConnectionConfig::default(),
			api_version: DEFAULT_API_VERSION.to_string(),
			access_token: None,
		}
	}
}

impl ClientConfig {
	pub fn new(connection: ConnectionConfig) -> Self {
		Self {
			connection,
			..Default::default()
		}
	}

	pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
		self.api_version = api_version.into();
		self
	}

	pub fn with_access_token(mut self, access_token: Option<AccessToken>) -> Self {
		self.access_token = access_token;
		self
	}

	/// Same API version and credentials, but the default gateway connection.
	pub fn with_default_connection(&self) -> Self {
		Self {
			connection: ConnectionConfig {
				ssl_enabled: self.connection.ssl_enabled,
				..Default::default()
			},
			..self.clone()
		}
	}

	/// `{base}/{path}`, outside any API version or namespace.
	pub fn resolve_url(&self, path: &str) -> Result<Url> {
		Ok(Url::parse(&format!(
			"{}/{}",
			self.connection.base_url(),
			path.trim_start_matches('/')
		))?)
	}

	/// `{base}/{api_version}/namespaces/{namespace}/{segments...}`.
	pub fn resolve_namespaced_url(&self, namespace: &str, segments: &[&str]) -> Result<Url> {
		let base = Url::parse(&self.connection.base_url())?;
		Ok(namespaced_url(base, &self.api_version, namespace, segments))
	}
}

/// Appends `{api_version}/namespaces/{namespace}/{segments...}` to `base`.
///
/// Every piece is percent-encoded as a single path segment, so a `/`, `?` or
/// `#` inside a namespace or entity name never changes the endpoint.
pub(crate) fn namespaced_url(
	mut base: Url,
	api_version: &str,
	namespace: &str,
	segments: &[&str],
) -> Url {
	// http(s) urls always have path segments
	if let Ok(mut path) = base.path_segments_mut() {
		path.pop_if_empty()
			.extend([api_version, "namespaces", namespace])
			.extend(segments);
	}

	base
}
