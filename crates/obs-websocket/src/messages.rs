//! Wire framing for both protocol revisions.
//!
//! Everything here is stateless: requests are encoded into JSON frames and
//! incoming text frames are classified into responses, events and handshake
//! messages. Correlating responses with callers is the connection's job.

mod current;
mod extractor;
mod legacy;

use crate::{ProtocolMismatchError, ProtocolRevision, RawEvent};
use serde_json::Value;

#[cfg(feature = "websocket")]
pub(crate) use current::identify;
pub(crate) use extractor::JsonExtractor;

/// Why an incoming text frame could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum DecodeError {
	/// The frame is well-formed for the other protocol revision.
	#[error("received a frame of the {0} protocol")]
	ForeignRevision(ProtocolRevision),

	#[error(transparent)]
	Malformed(#[from] ProtocolMismatchError),
}

/// OBS answered a request with a failure status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestFailure {
	pub code: Option<i64>,
	pub comment: String,
}

/// A classified incoming frame.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Incoming {
	/// 5.x `Hello` payload (`d`).
	Hello(Value),
	/// 5.x `Identified`.
	Identified,
	Response { id: String, outcome: Result<Value, RequestFailure> },
	Event(RawEvent),
	/// Frames this crate has no use for (batch responses, re-identify acks, ...).
	Ignored(String),
}

pub(crate) fn encode_request(revision: ProtocolRevision, request_id: &str, request_type: &str, request_data: Option<Value>) -> Value {
	match revision {
		ProtocolRevision::Legacy => legacy::encode_request(request_id, request_type, request_data),
		ProtocolRevision::Current => current::encode_request(request_id, request_type, request_data),
	}
}

pub(crate) fn decode(revision: ProtocolRevision, text: &str) -> Result<Incoming, DecodeError> {
	let json: Value = serde_json::from_str(text).map_err(|e| ProtocolMismatchError::new("OBS message", format!("invalid JSON: {e}")))?;

	match revision {
		ProtocolRevision::Legacy => legacy::decode(json),
		ProtocolRevision::Current => current::decode(json),
	}
}
