use thiserror::Error;

use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum Error {
	#[error("authentication is required by the gateway")]
	AuthenticationRequired,
	#[error("service unavailable: {0}")]
	ServiceUnavailable(String),
	#[error("not found: {0}")]
	NotFound(String),
	#[error("bad request: {0}")]
	BadRequest(String),
	#[error("unauthorized: {0}")]
	Unauthorized(String),
	#[error("unexpected response <status='{status}'>: {body}")]
	UnexpectedStatus { status: u16, body: String },

	#[error("invalid host header: '{0}'")]
	InvalidHostHeader(String),
	#[error("no coordination service quorum is configured")]
	MissingQuorum,
	#[error("unknown entity type: '{0}'")]
	UnknownEntityType(String),

	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error(transparent)]
	Url(#[from] url::ParseError),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	#[error(transparent)]
	Schema(#[from] SchemaError),
	#[error(transparent)]
	Discovery(#[from] tracker_discovery::Error),
}

/// The gateway rejected the caller for lack of credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("gateway requires authentication")]
pub struct AuthenticationRequired;

impl From<AuthenticationRequired> for Error {
	fn from(_: AuthenticationRequired) -> Self {
		Self::AuthenticationRequired
	}
}
