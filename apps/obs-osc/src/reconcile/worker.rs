use super::{Reconcile, Reconciler};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const QUEUE_DEPTH: usize = 32;

/// Starts the serial worker for one parameter.
///
/// The worker handles one item at a time. It exits once every sender is
/// dropped and the queue is empty, or as soon as `cancel` fires, dropping
/// whatever reaction is still waiting on OBS.
pub(super) fn spawn<R: Reconciler>(reconciler: R, cancel: CancellationToken) -> (mpsc::Sender<Reconcile<R::Observed>>, JoinHandle<()>) {
	let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
	(tx, tokio::spawn(drain(reconciler, rx, cancel)))
}

async fn drain<R: Reconciler>(mut reconciler: R, mut queue: mpsc::Receiver<Reconcile<R::Observed>>, cancel: CancellationToken) {
	loop {
		let item = tokio::select! {
			biased;
			() = cancel.cancelled() => break,
			item = queue.recv() => match item {
				Some(item) => item,
				None => {
					debug!(parameter = R::PARAMETER, "reconciler queue closed");
					return;
				}
			},
		};

		let outcome = tokio::select! {
			biased;
			() = cancel.cancelled() => break,
			outcome = react(&mut reconciler, item) => outcome,
		};

		// A failed reaction is abandoned; the next real change resynchronizes.
		if let Err(e) = outcome {
			warn!(parameter = R::PARAMETER, error = %e, "reconciliation abandoned");
		}
	}

	info!(parameter = R::PARAMETER, pending = queue.len(), "reconciler stopped by shutdown");
}

async fn react<R: Reconciler>(reconciler: &mut R, item: Reconcile<R::Observed>) -> crate::Result<()> {
	match item {
		Reconcile::ObsChanged(observed) => reconciler.obs_changed(observed).await,
		Reconcile::AvatarRequested(requested) => reconciler.avatar_requested(requested).await,
	}
}
