#![allow(dead_code)]

use async_broadcast::{Receiver, Sender};
use obs_osc::{ReconciliationLoop, Result};
use obs_websocket::{CallError, ControlFacade, ObsTransport, ProtocolRevision, RawEvent};
use osc_transport::{OscError, OscMessage, OscValue, ParameterSink, ParameterSource};
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Scripted OBS answering in the wire shapes of either revision.
pub struct FakeObs {
	revision: ProtocolRevision,
	streaming: bool,
	scenes: Vec<String>,
	current: String,
	rejected: Mutex<HashSet<String>>,
	calls: AtomicUsize,
	// Calls from this index on never complete.
	stall_after: AtomicUsize,
	commands: Mutex<Vec<(String, Option<Value>)>>,
	event_tx: Sender<RawEvent>,
	// Held so events pushed before the bridge subscribes are still delivered.
	event_rx: Receiver<RawEvent>,
}

impl FakeObs {
	pub fn new(revision: ProtocolRevision, streaming: bool, scenes: &[&str], current: &str) -> Self {
		let (event_tx, event_rx) = async_broadcast::broadcast(64);
		Self {
			revision,
			streaming,
			scenes: scenes.iter().map(ToString::to_string).collect(),
			current: current.to_string(),
			rejected: Mutex::new(HashSet::new()),
			calls: AtomicUsize::new(0),
			stall_after: AtomicUsize::new(usize::MAX),
			commands: Mutex::new(Vec::new()),
			event_tx,
			event_rx,
		}
	}

	pub fn reject(&self, request_type: &str) {
		self.rejected.lock().unwrap().insert(request_type.to_string());
	}

	/// Leaves every query after the first `answered` unanswered.
	pub fn stall_after(&self, answered: usize) {
		self.stall_after.store(answered, Ordering::SeqCst);
	}

	/// Queries received so far, answered or not.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn push(&self, event_type: &str, data: Value) {
		self.event_tx.try_broadcast(RawEvent::new(event_type, data)).unwrap();
	}

	/// Ends the event stream the way a dropped session does.
	pub fn close_events(&self) {
		self.event_tx.close();
	}

	pub fn commands(&self) -> Vec<(String, Option<Value>)> {
		self.commands.lock().unwrap().clone()
	}

	fn respond(&self, request_type: &str) -> Option<Value> {
		let legacy = self.revision == ProtocolRevision::Legacy;
		match (request_type, legacy) {
			("GetStreamingStatus", true) => Some(json!({ "streaming": self.streaming, "recording": false })),
			("GetStreamStatus", false) => Some(json!({ "outputActive": self.streaming, "outputReconnecting": false })),
			("GetSceneList", true) => Some(json!({
				"current-scene": self.current,
				"scenes": self.scenes.iter().map(|name| json!({ "name": name, "sources": [] })).collect::<Vec<_>>(),
			})),
			// 5.x lists scenes bottom-up.
			("GetSceneList", false) => Some(json!({
				"currentProgramSceneName": self.current,
				"scenes": self.scenes.iter().enumerate().rev().map(|(i, name)| json!({ "sceneIndex": i, "sceneName": name })).collect::<Vec<_>>(),
			})),
			("GetCurrentScene", true) => Some(json!({ "name": self.current, "sources": [] })),
			("GetCurrentProgramScene", false) => Some(json!({ "currentProgramSceneName": self.current })),
			_ => None,
		}
	}
}

#[async_trait::async_trait]
impl ObsTransport for FakeObs {
	async fn call(&self, request_type: &str, _request_data: Option<Value>) -> std::result::Result<Value, CallError> {
		if self.calls.fetch_add(1, Ordering::SeqCst) >= self.stall_after.load(Ordering::SeqCst) {
			std::future::pending::<()>().await;
		}

		let rejected = self.rejected.lock().unwrap().contains(request_type);
		match self.respond(request_type) {
			Some(response) if !rejected => Ok(response),
			_ => Err(CallError::Rejected {
				request: request_type.to_string(),
				code: Some(204),
				comment: "rejected by test".to_string(),
			}),
		}
	}

	async fn send(&self, request_type: &str, request_data: Option<Value>) -> std::result::Result<(), CallError> {
		self.commands.lock().unwrap().push((request_type.to_string(), request_data));
		Ok(())
	}

	fn events(&self) -> Receiver<RawEvent> {
		self.event_rx.clone()
	}
}

/// Records every avatar parameter write.
#[derive(Default)]
pub struct RecordingSink {
	sent: Mutex<Vec<(String, OscValue)>>,
}

impl RecordingSink {
	pub fn sent(&self) -> Vec<(String, OscValue)> {
		self.sent.lock().unwrap().clone()
	}
}

#[async_trait::async_trait]
impl ParameterSink for RecordingSink {
	async fn send(&self, path: &str, value: OscValue) -> osc_transport::Result<()> {
		self.sent.lock().unwrap().push((path.to_string(), value));
		Ok(())
	}
}

/// Replays a fixed sequence of receive outcomes, then reports exhaustion.
pub struct ScriptedSource(VecDeque<std::result::Result<OscMessage, OscError>>);

impl ScriptedSource {
	pub fn new(script: impl IntoIterator<Item = std::result::Result<OscMessage, OscError>>) -> Self {
		Self(script.into_iter().collect())
	}
}

#[async_trait::async_trait]
impl ParameterSource for ScriptedSource {
	async fn recv(&mut self) -> osc_transport::Result<OscMessage> {
		self.0.pop_front().unwrap_or(Err(OscError::Closed))
	}
}

pub struct Bridge {
	pub facade: Arc<ControlFacade<FakeObs>>,
	pub sink: Arc<RecordingSink>,
}

impl Bridge {
	pub fn new(obs: FakeObs) -> Self {
		let revision = obs.revision;
		Self {
			facade: Arc::new(ControlFacade::new(obs, revision)),
			sink: Arc::new(RecordingSink::default()),
		}
	}

	pub fn obs(&self) -> &FakeObs {
		self.facade.transport()
	}

	fn reconciliation(&self) -> ReconciliationLoop<FakeObs, RecordingSink> {
		ReconciliationLoop::new(self.facade.clone(), self.sink.clone(), CancellationToken::new())
	}

	/// Runs until every avatar message has been handled.
	pub async fn run_avatar(&self, messages: Vec<OscMessage>) -> Result<()> {
		let (tx, rx) = mpsc::channel(messages.len().max(1));
		for message in messages {
			tx.send(message).await.unwrap();
		}
		drop(tx);
		self.reconciliation().run(rx).await
	}

	/// Runs until the OBS event stream ends. Close it first.
	pub async fn run_obs(&self) -> Result<()> {
		let (_tx, rx) = mpsc::channel::<OscMessage>(1);
		self.reconciliation().run(rx).await
	}

	pub async fn run_cancelled(&self) -> Result<()> {
		let (_tx, rx) = mpsc::channel::<OscMessage>(1);
		let cancel = CancellationToken::new();
		cancel.cancel();
		self.run_with(cancel, rx).await
	}

	pub async fn run_with(&self, cancel: CancellationToken, source: impl ParameterSource) -> Result<()> {
		ReconciliationLoop::new(self.facade.clone(), self.sink.clone(), cancel).run(source).await
	}

	/// Runs until `source` is exhausted.
	pub async fn run_source(&self, source: impl ParameterSource) -> Result<()> {
		self.reconciliation().run(source).await
	}
}

pub fn int(path: &str, value: i32) -> (String, OscValue) {
	(path.to_string(), OscValue::Int(value))
}
