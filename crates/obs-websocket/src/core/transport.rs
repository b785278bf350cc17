use super::CallError;
use async_broadcast::Receiver;
use serde_json::Value;

/// An event exactly as OBS pushed it, before any revision normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
	pub event_type: String,
	pub data: Value,
}

impl RawEvent {
	pub fn new(event_type: impl Into<String>, data: Value) -> Self {
		Self {
			event_type: event_type.into(),
			data,
		}
	}
}

/// Request/response and push-event primitives of an OBS session.
///
/// Requests and events are revision-specific here; `ControlFacade` is the
/// only consumer that knows how to interpret them.
#[async_trait::async_trait]
pub trait ObsTransport: Send + Sync + 'static {
	/// Sends a request and waits for its response payload.
	async fn call(&self, request_type: &str, request_data: Option<Value>) -> Result<Value, CallError>;

	/// Sends a request without waiting for OBS to answer it.
	async fn send(&self, request_type: &str, request_data: Option<Value>) -> Result<(), CallError>;

	/// Opens a new receiver on the raw event stream.
	fn events(&self) -> Receiver<RawEvent>;

	/// Closes the session. Pending and later calls fail with `CallError::Closed`.
	async fn close(&self) {}
}
