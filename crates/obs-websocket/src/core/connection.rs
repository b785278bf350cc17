use crate::auth::{self, WsSink, WsSource};
use crate::messages::{self, Incoming, RequestFailure};
use crate::{CallError, ConnectionError, ObsConfig, ObsTransport, ProtocolRevision, RawEvent};
use async_broadcast::{InactiveReceiver, Receiver, Sender};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::{
	sync::{oneshot, Mutex},
	task::JoinHandle,
	time::Instant,
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message as TungsteniteMessage};
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

const EVENT_BUFFER: usize = 64;
const PING_INTERVAL: Duration = Duration::from_secs(30);
const IDLE_LIMIT: Duration = Duration::from_secs(120);

type Outcome = Result<Value, CallError>;

struct PendingCall {
	request_type: String,
	respond_to: oneshot::Sender<Outcome>,
}

/// In-flight calls keyed by request id. `None` once the reader has shut down.
type PendingCalls = Arc<Mutex<Option<HashMap<String, PendingCall>>>>;

type SharedSink = Arc<Mutex<WsSink>>;

/// The one WebSocket session to OBS.
///
/// A background reader task resolves responses by request id and fans
/// pushed events out to every subscriber.
pub struct ObsConnection {
	revision: ProtocolRevision,
	sink: SharedSink,
	pending: PendingCalls,
	events: InactiveReceiver<RawEvent>,
	reader: JoinHandle<()>,
}

impl ObsConnection {
	/// Connects and completes the handshake for `config.revision`.
	#[instrument(skip(config), fields(host = %config.host, port = config.port, revision = %config.revision))]
	pub async fn connect(config: &ObsConfig) -> Result<Self, ConnectionError> {
		let url = config.url();
		let (ws_stream, _) = connect_async(url.as_str()).await.map_err(|e| ConnectionError::Unreachable {
			url: url.clone(),
			reason: e.to_string(),
		})?;

		let (mut sink, mut stream) = ws_stream.split();
		auth::handshake(config.revision, &config.password, &mut sink, &mut stream).await?;

		let (mut event_tx, event_rx) = async_broadcast::broadcast(EVENT_BUFFER);
		event_tx.set_overflow(true);
		event_tx.set_await_active(false);

		let sink = Arc::new(Mutex::new(sink));
		let pending: PendingCalls = Arc::new(Mutex::new(Some(HashMap::new())));

		let reader = tokio::spawn(message_processing_loop(config.revision, stream, sink.clone(), pending.clone(), event_tx));

		info!(%url, "OBS session established");

		Ok(Self {
			revision: config.revision,
			sink,
			pending,
			events: event_rx.deactivate(),
			reader,
		})
	}

	pub const fn revision(&self) -> ProtocolRevision {
		self.revision
	}

	pub fn is_closed(&self) -> bool {
		self.reader.is_finished()
	}

	async fn write(&self, frame: Value) -> Result<(), CallError> {
		let mut sink = self.sink.lock().await;
		sink.send(TungsteniteMessage::Text(frame.to_string().into())).await.map_err(|e| CallError::Send(e.to_string()))
	}
}

fn request_id(prefix: &str) -> String {
	format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[async_trait::async_trait]
impl ObsTransport for ObsConnection {
	#[instrument(skip(self, request_data))]
	async fn call(&self, request_type: &str, request_data: Option<Value>) -> Result<Value, CallError> {
		if self.is_closed() {
			return Err(CallError::Closed);
		}

		let id = request_id("call");
		let (tx, rx) = oneshot::channel();

		{
			let mut pending = self.pending.lock().await;
			let calls = pending.as_mut().ok_or(CallError::Closed)?;
			calls.insert(
				id.clone(),
				PendingCall {
					request_type: request_type.to_string(),
					respond_to: tx,
				},
			);
		}

		let frame = messages::encode_request(self.revision, &id, request_type, request_data);
		if let Err(e) = self.write(frame).await {
			if let Some(calls) = self.pending.lock().await.as_mut() {
				calls.remove(&id);
			}
			return Err(e);
		}

		trace!(%id, "awaiting response");
		rx.await.map_err(|_| CallError::Closed)?
	}

	#[instrument(skip(self, request_data))]
	async fn send(&self, request_type: &str, request_data: Option<Value>) -> Result<(), CallError> {
		if self.is_closed() || self.pending.lock().await.is_none() {
			return Err(CallError::Closed);
		}

		let frame = messages::encode_request(self.revision, &request_id("cmd"), request_type, request_data);
		self.write(frame).await
	}

	fn events(&self) -> Receiver<RawEvent> {
		self.events.activate_cloned()
	}

	async fn close(&self) {
		// The reader is aborted below and never runs its own cleanup, so fail
		// in-flight calls and refuse new ones here.
		if let Some(calls) = self.pending.lock().await.take() {
			if !calls.is_empty() {
				debug!(count = calls.len(), "failing in-flight OBS requests on close");
			}
		}

		let mut sink = self.sink.lock().await;
		if let Err(e) = sink.close().await {
			debug!(error = %e, "error closing OBS socket");
		}
		self.reader.abort();
	}
}

impl Drop for ObsConnection {
	fn drop(&mut self) {
		self.reader.abort();
	}
}

async fn message_processing_loop(revision: ProtocolRevision, mut stream: WsSource, sink: SharedSink, pending: PendingCalls, event_tx: Sender<RawEvent>) {
	let mut last_activity = Instant::now();
	let mut ping_interval = tokio::time::interval_at(Instant::now() + PING_INTERVAL, PING_INTERVAL);
	ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

	loop {
		tokio::select! {
			msg = stream.next() => {
				match msg {
					Some(Ok(TungsteniteMessage::Text(text))) => {
						last_activity = Instant::now();
						dispatch(revision, text.as_str(), &pending, &event_tx).await;
					}
					Some(Ok(TungsteniteMessage::Ping(payload))) => {
						last_activity = Instant::now();
						let mut sink_guard = sink.lock().await;
						let _ = sink_guard.send(TungsteniteMessage::Pong(payload)).await;
					}
					Some(Ok(TungsteniteMessage::Close(frame))) => {
						info!(?frame, "OBS closed the WebSocket");
						break;
					}
					Some(Ok(_)) => {
						last_activity = Instant::now();
					}
					Some(Err(e)) => {
						error!("WebSocket error: {}", e);
						break;
					}
					None => {
						info!("WebSocket stream ended");
						break;
					}
				}
			}
			_ = ping_interval.tick() => {
				if last_activity.elapsed() > IDLE_LIMIT {
					error!("Connection appears dead (no activity for {:?}), breaking", IDLE_LIMIT);
					break;
				}

				let mut sink_guard = sink.lock().await;
				if sink_guard.send(TungsteniteMessage::Ping(Default::default())).await.is_err() {
					error!("Failed to send ping, connection likely dead");
					break;
				}
			}
		}
	}

	// Dropping the responders fails every in-flight call with `CallError::Closed`.
	if let Some(calls) = pending.lock().await.take() {
		if !calls.is_empty() {
			warn!(count = calls.len(), "failing in-flight OBS requests");
		}
	}
	event_tx.close();
	info!("OBS message loop ended");
}

async fn dispatch(revision: ProtocolRevision, text: &str, pending: &PendingCalls, event_tx: &Sender<RawEvent>) {
	match messages::decode(revision, text) {
		Ok(Incoming::Response { id, outcome }) => {
			let call = pending.lock().await.as_mut().and_then(|calls| calls.remove(&id));
			match call {
				Some(call) => {
					let outcome = outcome.map_err(|RequestFailure { code, comment }| CallError::Rejected {
						request: call.request_type,
						code,
						comment,
					});
					let _ = call.respond_to.send(outcome);
				}
				None => match outcome {
					Ok(_) => trace!(%id, "response to fire-and-forget request"),
					Err(failure) => warn!(%id, code = ?failure.code, comment = %failure.comment, "OBS rejected a command"),
				},
			}
		}
		Ok(Incoming::Event(event)) => {
			trace!(event_type = %event.event_type, "OBS event");
			let _ = event_tx.broadcast(event).await;
		}
		Ok(other) => debug!(?other, "ignoring OBS frame"),
		Err(e) => warn!(error = %e, "undecodable OBS frame"),
	}
}
