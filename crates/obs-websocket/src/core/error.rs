use crate::ProtocolRevision;
use std::time::Duration;
use thiserror::Error;

/// Failures while opening the session. All of them are fatal to the caller.
#[derive(Error, Debug)]
pub enum ConnectionError {
	#[error("Failed to reach OBS at {url}: {reason}")]
	Unreachable { url: String, reason: String },

	#[error("Authentication rejected by OBS: {0}")]
	AuthenticationFailed(String),

	#[error("Handshake failed: {0}")]
	Handshake(String),

	#[error("OBS does not speak the {expected} protocol: {detail}")]
	RevisionMismatch { expected: ProtocolRevision, detail: String },

	#[error("Connection closed during handshake (code {code:?}): {reason}")]
	Closed { code: Option<u16>, reason: String },

	#[error("Handshake timed out after {0:?}")]
	Timeout(Duration),

	#[error("Failed to send handshake frame: {0}")]
	Send(String),

	#[error(transparent)]
	Protocol(#[from] ProtocolMismatchError),
}

/// Failures of a single request on an established session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
	#[error("OBS rejected {request} (code {code:?}): {comment}")]
	Rejected { request: String, code: Option<i64>, comment: String },

	#[error("Connection to OBS is closed")]
	Closed,

	#[error("Failed to send request: {0}")]
	Send(String),

	#[error(transparent)]
	ProtocolMismatch(#[from] ProtocolMismatchError),
}

/// A frame or response did not have the shape the configured revision promises.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unexpected {context} shape: {detail}")]
pub struct ProtocolMismatchError {
	pub context: String,
	pub detail: String,
}

impl ProtocolMismatchError {
	pub fn new(context: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			context: context.into(),
			detail: detail.into(),
		}
	}

	pub fn missing_field(context: impl Into<String>, field: &str) -> Self {
		Self::new(context, format!("missing field '{field}'"))
	}

	pub fn invalid_type(context: impl Into<String>, field: &str, expected: &str) -> Self {
		Self::new(context, format!("field '{field}' is not a {expected}"))
	}
}
