use crate::RawEvent;
use async_broadcast::{Receiver, RecvError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

/// 5.x transitional output states. They are never forwarded.
pub const OUTPUT_STARTING: &str = "OBS_WEBSOCKET_OUTPUT_STARTING";
pub const OUTPUT_STOPPING: &str = "OBS_WEBSOCKET_OUTPUT_STOPPING";

/// Revision-independent OBS change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ObsEvent {
	StreamingChanged { active: bool },
	SceneChanged { name: String },
}

/// 4.x: `StreamStarting` / `StreamStopping` / `SwitchScenes`.
pub(crate) fn normalize_legacy(event: &RawEvent) -> Option<ObsEvent> {
	match event.event_type.as_str() {
		"StreamStarting" => Some(ObsEvent::StreamingChanged { active: true }),
		"StreamStopping" => Some(ObsEvent::StreamingChanged { active: false }),
		"SwitchScenes" => scene_changed(event, "scene-name"),
		_ => None,
	}
}

/// 5.x: `StreamStateChanged` / `CurrentProgramSceneChanged`.
pub(crate) fn normalize_current(event: &RawEvent) -> Option<ObsEvent> {
	match event.event_type.as_str() {
		"StreamStateChanged" => {
			let state = event.data.get("outputState").and_then(Value::as_str);
			if matches!(state, Some(OUTPUT_STARTING | OUTPUT_STOPPING)) {
				trace!(?state, "skipping transitional stream state");
				return None;
			}

			match event.data.get("outputActive").and_then(Value::as_bool) {
				Some(active) => Some(ObsEvent::StreamingChanged { active }),
				None => {
					warn!(data = %event.data, "StreamStateChanged without outputActive");
					None
				}
			}
		}
		"CurrentProgramSceneChanged" => scene_changed(event, "sceneName"),
		_ => None,
	}
}

fn scene_changed(event: &RawEvent, field: &str) -> Option<ObsEvent> {
	match event.data.get(field).and_then(Value::as_str) {
		Some(name) => Some(ObsEvent::SceneChanged { name: name.to_string() }),
		None => {
			warn!(event_type = %event.event_type, field, "scene event without scene name");
			None
		}
	}
}

/// Receiver of normalized events for one subscriber.
pub struct ObsEventReceiver {
	inner: Receiver<RawEvent>,
	normalize: fn(&RawEvent) -> Option<ObsEvent>,
}

impl ObsEventReceiver {
	pub(crate) fn new(inner: Receiver<RawEvent>, normalize: fn(&RawEvent) -> Option<ObsEvent>) -> Self {
		Self { inner, normalize }
	}

	/// Waits for the next event this bridge cares about.
	///
	/// Returns `None` once the session is gone.
	pub async fn recv(&mut self) -> Option<ObsEvent> {
		loop {
			match self.inner.recv().await {
				Ok(raw) => {
					if let Some(event) = (self.normalize)(&raw) {
						return Some(event);
					}
					trace!(event_type = %raw.event_type, "ignoring OBS event");
				}
				Err(RecvError::Overflowed(dropped)) => {
					warn!(dropped, "OBS event receiver lagged, events dropped");
				}
				Err(RecvError::Closed) => return None,
			}
		}
	}
}
