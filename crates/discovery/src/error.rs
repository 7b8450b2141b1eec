use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("failed to connect to coordination service <quorum='{quorum}'>: {reason}")]
	Connect { quorum: String, reason: String },
	#[error("coordination service request failed <path='{path}'>: {reason}")]
	Request { path: String, reason: String },
}
