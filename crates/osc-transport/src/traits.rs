use crate::{OscError, OscMessage, OscValue, Result};
use tokio::sync::mpsc;

/// Where avatar parameter values are written to.
#[async_trait::async_trait]
pub trait ParameterSink: Send + Sync + 'static {
	async fn send(&self, path: &str, value: OscValue) -> Result<()>;
}

/// Where avatar parameter writes come from.
#[async_trait::async_trait]
pub trait ParameterSource: Send + 'static {
	/// Waits for the next parameter write.
	///
	/// [`OscError::Closed`] means the source is exhausted; any other error
	/// means the underlying socket failed.
	async fn recv(&mut self) -> Result<OscMessage>;
}

#[async_trait::async_trait]
impl ParameterSource for mpsc::Receiver<OscMessage> {
	async fn recv(&mut self) -> Result<OscMessage> {
		Self::recv(self).await.ok_or(OscError::Closed)
	}
}
