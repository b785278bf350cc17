use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("OBS connection failed: {0}")]
	Connection(#[from] obs_websocket::ConnectionError),

	#[error("OBS request failed: {0}")]
	Call(#[from] obs_websocket::CallError),

	#[error("OSC transport error: {0}")]
	Osc(#[from] osc_transport::OscError),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("OBS session closed")]
	SessionClosed,
}
