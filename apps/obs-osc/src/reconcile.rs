//! Two-way sync between OBS and the avatar parameters.
//!
//! Each parameter has a reconciler that owns its own queue and worker task,
//! so reactions for one parameter never overlap while the other parameter
//! proceeds freely. OBS events are forwarded to the avatar; avatar writes are
//! checked against fresh OBS state and dropped when OBS already agrees.

mod parameter;
mod scene;
mod stream;
mod worker;

use crate::{Error, Result};
use obs_websocket::{ControlFacade, ObsEvent, ObsEventReceiver, ObsTransport};
use osc_transport::{OscError, OscValue, ParameterSink, ParameterSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

pub use parameter::AvatarParameter;
pub use scene::SceneReconciler;
pub use stream::StreamReconciler;

pub const STREAM_PARAMETER: &str = "/avatar/parameters/stream";
pub const SCENE_PARAMETER: &str = "/avatar/parameters/scene";

/// Pause after a failed OSC receive before trying again.
const RECV_RETRY_DELAY: Duration = Duration::from_millis(100);

/// One unit of work on a parameter queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconcile<T> {
	/// OBS reported a settled change.
	ObsChanged(T),
	/// The avatar wrote a value and expects OBS to follow.
	AvatarRequested(OscValue),
}

/// Per-parameter reaction logic. Methods are only ever called from that
/// parameter's worker, one at a time.
#[async_trait::async_trait]
pub trait Reconciler: Send + 'static {
	type Observed: Send + 'static;

	/// Avatar parameter path this reconciler owns.
	const PARAMETER: &'static str;

	/// Pushes the current OBS value once, before any event is handled.
	async fn prime(&mut self) -> Result<()>;

	async fn obs_changed(&mut self, observed: Self::Observed) -> Result<()>;

	async fn avatar_requested(&mut self, requested: OscValue) -> Result<()>;
}

/// Owns the bridge for the lifetime of one OBS session.
pub struct ReconciliationLoop<T, S> {
	facade: Arc<ControlFacade<T>>,
	sink: Arc<S>,
	cancel: CancellationToken,
}

impl<T: ObsTransport, S: ParameterSink> ReconciliationLoop<T, S> {
	pub const fn new(facade: Arc<ControlFacade<T>>, sink: Arc<S>, cancel: CancellationToken) -> Self {
		Self { facade, sink, cancel }
	}

	/// Primes both parameters, then reconciles until cancelled.
	///
	/// Priming failures are returned before any event is handled. Returns
	/// [`Error::SessionClosed`] when OBS goes away and `Ok` when `source` is
	/// exhausted or the token is cancelled. Queued work is drained unless the
	/// token is cancelled, in which case in-progress reactions are dropped.
	pub async fn run(self, source: impl ParameterSource) -> Result<()> {
		// Subscribe first so nothing pushed during priming is lost; it waits
		// in the channel until the workers exist.
		let events = self.facade.subscribe();

		let mut stream = StreamReconciler::new(self.facade.clone(), self.sink.clone());
		let mut scene = SceneReconciler::new(self.facade.clone(), self.sink.clone());
		let primed = tokio::select! {
			biased;
			() = self.cancel.cancelled() => {
				info!("🛑 Cancelled before priming completed");
				return Ok(());
			}
			primed = async {
				stream.prime().await?;
				scene.prime().await
			} => primed,
		};
		primed?;
		info!("✅ Avatar parameters primed");

		let (stream_queue, stream_worker) = worker::spawn(stream, self.cancel.clone());
		let (scene_queue, scene_worker) = worker::spawn(scene, self.cancel.clone());
		let router = Router {
			stream: stream_queue,
			scene: scene_queue,
		};

		let outcome = tokio::select! {
			() = self.cancel.cancelled() => {
				info!("🛑 Reconciliation cancelled");
				Ok(())
			}
			() = router.forward_obs_events(events) => Err(Error::SessionClosed),
			() = router.forward_avatar_requests(source) => Ok(()),
		};

		drop(router);
		let _ = tokio::join!(stream_worker, scene_worker);
		outcome
	}
}

struct Router {
	stream: mpsc::Sender<Reconcile<bool>>,
	scene: mpsc::Sender<Reconcile<String>>,
}

impl Router {
	async fn forward_obs_events(&self, mut events: ObsEventReceiver) {
		while let Some(event) = events.recv().await {
			let delivered = match event {
				ObsEvent::StreamingChanged { active } => self.stream.send(Reconcile::ObsChanged(active)).await.is_ok(),
				ObsEvent::SceneChanged { name } => self.scene.send(Reconcile::ObsChanged(name)).await.is_ok(),
			};
			if !delivered {
				error!("reconciler queue closed, dropping OBS events");
				return;
			}
		}

		warn!("OBS event stream ended");
	}

	async fn forward_avatar_requests(&self, mut source: impl ParameterSource) {
		loop {
			let message = match source.recv().await {
				Ok(message) => message,
				Err(OscError::Closed) => {
					info!("avatar parameter source closed");
					return;
				}
				Err(e) => {
					warn!(error = %e, "failed to receive avatar parameters");
					tokio::time::sleep(RECV_RETRY_DELAY).await;
					continue;
				}
			};

			let delivered = match message.path.as_str() {
				STREAM_PARAMETER => self.stream.send(Reconcile::AvatarRequested(message.value)).await.is_ok(),
				SCENE_PARAMETER => self.scene.send(Reconcile::AvatarRequested(message.value)).await.is_ok(),
				other => {
					trace!(path = other, "ignoring avatar parameter");
					true
				}
			};
			if !delivered {
				error!("reconciler queue closed, dropping avatar requests");
				return;
			}
		}
	}
}
