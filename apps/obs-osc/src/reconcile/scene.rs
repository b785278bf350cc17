use super::{AvatarParameter, Reconciler, SCENE_PARAMETER};
use crate::scene_index::{index_of, scene_at};
use crate::Result;
use obs_websocket::{ControlFacade, ObsTransport};
use osc_transport::{OscValue, ParameterSink};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Keeps `/avatar/parameters/scene` and the OBS program scene in step.
///
/// The scene list is fetched again for every reaction; scenes can be added,
/// removed or reordered in OBS at any time.
pub struct SceneReconciler<T, S> {
	facade: Arc<ControlFacade<T>>,
	parameter: AvatarParameter<S>,
}

impl<T: ObsTransport, S: ParameterSink> SceneReconciler<T, S> {
	pub const fn new(facade: Arc<ControlFacade<T>>, sink: Arc<S>) -> Self {
		Self {
			facade,
			parameter: AvatarParameter::new(sink, SCENE_PARAMETER),
		}
	}
}

#[async_trait::async_trait]
impl<T: ObsTransport, S: ParameterSink> Reconciler for SceneReconciler<T, S> {
	type Observed = String;

	const PARAMETER: &'static str = SCENE_PARAMETER;

	async fn prime(&mut self) -> Result<()> {
		let scenes = self.facade.get_scene_list().await?;
		let current = self.facade.get_current_scene().await?;
		self.parameter.emit(index_of(&scenes, &current)).await
	}

	async fn obs_changed(&mut self, name: String) -> Result<()> {
		let scenes = self.facade.get_scene_list().await?;
		let index = index_of(&scenes, &name);
		if index < 0 {
			warn!(scene = %name, "current scene not in scene list");
		}
		self.parameter.emit_changed(index).await
	}

	#[instrument(skip(self), fields(parameter = SCENE_PARAMETER))]
	async fn avatar_requested(&mut self, requested: OscValue) -> Result<()> {
		self.parameter.forget();
		let Some(index) = requested.as_index() else {
			warn!(%requested, "scene request is not an index, ignoring");
			return Ok(());
		};

		let scenes = self.facade.get_scene_list().await?;
		let Some(target) = scene_at(&scenes, index) else {
			warn!(index, count = scenes.len(), "scene request out of range, ignoring");
			return Ok(());
		};

		let current = self.facade.get_current_scene().await?;
		if current == target {
			debug!(scene = target, "OBS already on requested scene");
			return Ok(());
		}

		info!(scene = target, index, "🎞️ Avatar requested scene change");
		self.facade.set_scene(target).await?;
		Ok(())
	}
}
