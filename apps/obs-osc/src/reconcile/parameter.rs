use crate::Result;
use osc_transport::{OscValue, ParameterSink};
use std::sync::Arc;
use tracing::{debug, trace};

/// The avatar side of one parameter, as far as this process knows it.
pub struct AvatarParameter<S> {
	sink: Arc<S>,
	path: &'static str,
	last_sent: Option<i32>,
}

impl<S: ParameterSink> AvatarParameter<S> {
	pub const fn new(sink: Arc<S>, path: &'static str) -> Self {
		Self { sink, path, last_sent: None }
	}

	pub const fn path(&self) -> &'static str {
		self.path
	}

	pub const fn last_sent(&self) -> Option<i32> {
		self.last_sent
	}

	/// Sends `value` regardless of what was sent before.
	pub async fn emit(&mut self, value: i32) -> Result<()> {
		self.sink.send(self.path, OscValue::Int(value)).await?;
		debug!(path = self.path, value, "avatar parameter updated");
		self.last_sent = Some(value);
		Ok(())
	}

	/// Sends `value` unless it is what this parameter last sent.
	pub async fn emit_changed(&mut self, value: i32) -> Result<()> {
		if self.last_sent == Some(value) {
			trace!(path = self.path, value, "unchanged, not resending");
			return Ok(());
		}
		self.emit(value).await
	}

	/// The avatar wrote this parameter itself, so the last sent value no
	/// longer describes what it holds.
	pub fn forget(&mut self) {
		self.last_sent = None;
	}
}
