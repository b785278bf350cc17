use std::io;

#[derive(Debug, thiserror::Error)]
pub enum OscError {
	#[error("Failed to bind OSC socket on {addr}: {source}")]
	Bind {
		addr: String,
		#[source]
		source: io::Error,
	},

	#[error("Could not resolve OSC target {0}")]
	Resolve(String),

	#[error("Failed to encode OSC packet: {0}")]
	Encode(String),

	#[error("OSC socket error: {0}")]
	Io(#[from] io::Error),

	/// The parameter source has no more messages.
	#[error("OSC source closed")]
	Closed,
}

pub type Result<T> = std::result::Result<T, OscError>;
