use crate::messages::JsonExtractor;
use crate::revision::{Dialect, SCENES_FIELD};
use crate::{CallError, ObsEventReceiver, ObsTransport, ProtocolMismatchError, ProtocolRevision};
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[cfg(feature = "websocket")]
use crate::{ConnectionError, ObsConfig, ObsConnection};

/// Revision-independent view of one OBS session.
///
/// The protocol revision is bound at construction. Callers only ever see
/// stream on/off, scene names and normalized events.
pub struct ControlFacade<T> {
	transport: T,
	revision: ProtocolRevision,
	dialect: &'static Dialect,
}

#[cfg(feature = "websocket")]
impl ControlFacade<ObsConnection> {
	/// Opens the WebSocket session described by `config` and completes the handshake.
	pub async fn connect(config: &ObsConfig) -> Result<Self, ConnectionError> {
		let connection = ObsConnection::connect(config).await?;
		Ok(Self::new(connection, config.revision))
	}
}

impl<T: ObsTransport> ControlFacade<T> {
	pub fn new(transport: T, revision: ProtocolRevision) -> Self {
		Self {
			transport,
			revision,
			dialect: revision.dialect(),
		}
	}

	pub const fn revision(&self) -> ProtocolRevision {
		self.revision
	}

	pub const fn transport(&self) -> &T {
		&self.transport
	}

	#[instrument(skip(self), fields(revision = %self.revision))]
	pub async fn get_stream_status(&self) -> Result<bool, CallError> {
		let request = self.dialect.get_stream_status;
		let response = self.transport.call(request, None).await?;
		let context = response_context(request);
		let active = JsonExtractor::new(&response, &context).get_bool(self.dialect.stream_active_field)?;

		debug!(active, "stream status");
		Ok(active)
	}

	/// Scene names in scene-dock order, top first.
	#[instrument(skip(self), fields(revision = %self.revision))]
	pub async fn get_scene_list(&self) -> Result<Vec<String>, CallError> {
		let request = self.dialect.get_scene_list;
		let response = self.transport.call(request, None).await?;
		let context = response_context(request);
		let scenes = JsonExtractor::new(&response, &context).get_array(SCENES_FIELD)?;

		let mut names = scenes
			.iter()
			.map(|scene| JsonExtractor::new(scene, &context).get_str(self.dialect.scene_name_field).map(str::to_string))
			.collect::<Result<Vec<_>, ProtocolMismatchError>>()?;

		if self.dialect.reverse_scene_list {
			names.reverse();
		}

		debug!(count = names.len(), "scene list");
		Ok(names)
	}

	#[instrument(skip(self), fields(revision = %self.revision))]
	pub async fn get_current_scene(&self) -> Result<String, CallError> {
		let request = self.dialect.get_current_scene;
		let response = self.transport.call(request, None).await?;
		let context = response_context(request);
		let name = JsonExtractor::new(&response, &context).get_str(self.dialect.current_scene_field)?;

		debug!(scene = name, "current scene");
		Ok(name.to_string())
	}

	/// Switches the program scene. Only the request write is awaited.
	#[instrument(skip(self), fields(revision = %self.revision))]
	pub async fn set_scene(&self, name: &str) -> Result<(), CallError> {
		let mut params = serde_json::Map::new();
		params.insert(self.dialect.set_scene_field.to_string(), json!(name));

		self.transport.send(self.dialect.set_current_scene, Some(Value::Object(params))).await
	}

	/// Starts or stops the stream output. Only the request write is awaited.
	#[instrument(skip(self), fields(revision = %self.revision))]
	pub async fn set_stream(&self, enable: bool) -> Result<(), CallError> {
		let request = if enable { self.dialect.start_stream } else { self.dialect.stop_stream };
		self.transport.send(request, None).await
	}

	/// New subscriber yielding only `StreamingChanged` and `SceneChanged`.
	pub fn subscribe(&self) -> ObsEventReceiver {
		ObsEventReceiver::new(self.transport.events(), self.dialect.normalize_event)
	}

	pub async fn close(&self) {
		self.transport.close().await;
	}
}

fn response_context(request: &str) -> String {
	format!("{request} response")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ObsEvent, RawEvent};
	use async_broadcast::{InactiveReceiver, Sender};
	use std::collections::HashMap;
	use std::sync::Mutex;

	struct FakeTransport {
		responses: HashMap<&'static str, Value>,
		sent: Mutex<Vec<(String, Option<Value>)>>,
		event_tx: Sender<RawEvent>,
		event_rx: InactiveReceiver<RawEvent>,
	}

	impl FakeTransport {
		fn new(responses: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
			let (event_tx, event_rx) = async_broadcast::broadcast(16);
			Self {
				responses: responses.into_iter().collect(),
				sent: Mutex::new(Vec::new()),
				event_tx,
				event_rx: event_rx.deactivate(),
			}
		}

		fn sent(&self) -> Vec<(String, Option<Value>)> {
			self.sent.lock().unwrap().clone()
		}
	}

	#[async_trait::async_trait]
	impl ObsTransport for FakeTransport {
		async fn call(&self, request_type: &str, _request_data: Option<Value>) -> Result<Value, CallError> {
			self.responses.get(request_type).cloned().ok_or_else(|| CallError::Rejected {
				request: request_type.to_string(),
				code: Some(204),
				comment: "unknown request type".to_string(),
			})
		}

		async fn send(&self, request_type: &str, request_data: Option<Value>) -> Result<(), CallError> {
			self.sent.lock().unwrap().push((request_type.to_string(), request_data));
			Ok(())
		}

		fn events(&self) -> async_broadcast::Receiver<RawEvent> {
			self.event_rx.activate_cloned()
		}
	}

	#[tokio::test]
	async fn current_scene_list_is_reversed() {
		let transport = FakeTransport::new([(
			"GetSceneList",
			json!({ "currentProgramSceneName": "A", "scenes": [
				{ "sceneIndex": 2, "sceneName": "C" },
				{ "sceneIndex": 1, "sceneName": "B" },
				{ "sceneIndex": 0, "sceneName": "A" }
			]}),
		)]);
		let facade = ControlFacade::new(transport, ProtocolRevision::Current);

		assert_eq!(facade.get_scene_list().await.unwrap(), vec!["A", "B", "C"]);
	}

	#[tokio::test]
	async fn legacy_scene_list_keeps_order() {
		let transport = FakeTransport::new([(
			"GetSceneList",
			json!({ "current-scene": "A", "scenes": [
				{ "name": "A", "sources": [] },
				{ "name": "B", "sources": [] },
				{ "name": "C", "sources": [] }
			]}),
		)]);
		let facade = ControlFacade::new(transport, ProtocolRevision::Legacy);

		assert_eq!(facade.get_scene_list().await.unwrap(), vec!["A", "B", "C"]);
	}

	#[tokio::test]
	async fn stream_status_reads_revision_field() {
		let legacy = ControlFacade::new(FakeTransport::new([("GetStreamingStatus", json!({ "streaming": true, "recording": false }))]), ProtocolRevision::Legacy);
		let current = ControlFacade::new(FakeTransport::new([("GetStreamStatus", json!({ "outputActive": false }))]), ProtocolRevision::Current);

		assert!(legacy.get_stream_status().await.unwrap());
		assert!(!current.get_stream_status().await.unwrap());
	}

	#[tokio::test]
	async fn current_scene_reads_revision_field() {
		let legacy = ControlFacade::new(FakeTransport::new([("GetCurrentScene", json!({ "name": "Intro", "sources": [] }))]), ProtocolRevision::Legacy);
		let current = ControlFacade::new(FakeTransport::new([("GetCurrentProgramScene", json!({ "currentProgramSceneName": "Outro" }))]), ProtocolRevision::Current);

		assert_eq!(legacy.get_current_scene().await.unwrap(), "Intro");
		assert_eq!(current.get_current_scene().await.unwrap(), "Outro");
	}

	#[tokio::test]
	async fn unexpected_response_shape_is_protocol_mismatch() {
		let facade = ControlFacade::new(FakeTransport::new([("GetStreamStatus", json!({ "streaming": true }))]), ProtocolRevision::Current);

		match facade.get_stream_status().await {
			Err(CallError::ProtocolMismatch(err)) => {
				assert_eq!(err.context, "GetStreamStatus response");
				assert_eq!(err.detail, "missing field 'outputActive'");
			}
			other => panic!("expected protocol mismatch, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn commands_use_revision_request_names() {
		let legacy = ControlFacade::new(FakeTransport::new([]), ProtocolRevision::Legacy);
		legacy.set_scene("Game").await.unwrap();
		legacy.set_stream(true).await.unwrap();
		legacy.set_stream(false).await.unwrap();
		assert_eq!(
			legacy.transport().sent(),
			vec![
				("SetCurrentScene".to_string(), Some(json!({ "scene-name": "Game" }))),
				("StartStreaming".to_string(), None),
				("StopStreaming".to_string(), None),
			]
		);

		let current = ControlFacade::new(FakeTransport::new([]), ProtocolRevision::Current);
		current.set_scene("Game").await.unwrap();
		current.set_stream(true).await.unwrap();
		current.set_stream(false).await.unwrap();
		assert_eq!(
			current.transport().sent(),
			vec![
				("SetCurrentProgramScene".to_string(), Some(json!({ "sceneName": "Game" }))),
				("StartStream".to_string(), None),
				("StopStream".to_string(), None),
			]
		);
	}

	#[tokio::test]
	async fn subscription_normalizes_with_bound_revision() {
		let facade = ControlFacade::new(FakeTransport::new([]), ProtocolRevision::Current);
		let mut events = facade.subscribe();
		let tx = facade.transport().event_tx.clone();

		tx.broadcast(RawEvent::new("StreamStateChanged", json!({ "outputActive": false, "outputState": "OBS_WEBSOCKET_OUTPUT_STARTING" })))
			.await
			.unwrap();
		tx.broadcast(RawEvent::new("StreamStateChanged", json!({ "outputActive": true, "outputState": "OBS_WEBSOCKET_OUTPUT_STARTED" })))
			.await
			.unwrap();

		assert_eq!(events.recv().await, Some(ObsEvent::StreamingChanged { active: true }));
	}
}
