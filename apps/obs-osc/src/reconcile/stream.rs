use super::{AvatarParameter, Reconciler, STREAM_PARAMETER};
use crate::Result;
use obs_websocket::{ControlFacade, ObsTransport};
use osc_transport::{OscValue, ParameterSink};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Keeps `/avatar/parameters/stream` and the OBS stream output in step.
pub struct StreamReconciler<T, S> {
	facade: Arc<ControlFacade<T>>,
	parameter: AvatarParameter<S>,
}

impl<T: ObsTransport, S: ParameterSink> StreamReconciler<T, S> {
	pub const fn new(facade: Arc<ControlFacade<T>>, sink: Arc<S>) -> Self {
		Self {
			facade,
			parameter: AvatarParameter::new(sink, STREAM_PARAMETER),
		}
	}
}

#[async_trait::async_trait]
impl<T: ObsTransport, S: ParameterSink> Reconciler for StreamReconciler<T, S> {
	type Observed = bool;

	const PARAMETER: &'static str = STREAM_PARAMETER;

	async fn prime(&mut self) -> Result<()> {
		let active = self.facade.get_stream_status().await?;
		self.parameter.emit(i32::from(active)).await
	}

	async fn obs_changed(&mut self, active: bool) -> Result<()> {
		self.parameter.emit_changed(i32::from(active)).await
	}

	#[instrument(skip(self), fields(parameter = STREAM_PARAMETER))]
	async fn avatar_requested(&mut self, requested: OscValue) -> Result<()> {
		self.parameter.forget();
		let enable = requested.as_bool();

		let active = self.facade.get_stream_status().await?;
		if active == enable {
			debug!(active, "OBS already in requested stream state");
			return Ok(());
		}

		info!(enable, "🎬 Avatar requested stream change");
		self.facade.set_stream(enable).await?;
		Ok(())
	}
}
