use crate::ProtocolRevision;
use serde::{Deserialize, Serialize};

/// Everything needed to open the single OBS session.
#[derive(Clone, Serialize, Deserialize)]
pub struct ObsConfig {
	pub host: String,
	pub port: u16,
	pub password: String,
	pub revision: ProtocolRevision,
}

impl ObsConfig {
	pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>, revision: ProtocolRevision) -> Self {
		Self {
			host: host.into(),
			port,
			password: password.into(),
			revision,
		}
	}

	/// Both revisions listen on a plain `ws://` endpoint.
	pub fn url(&self) -> String {
		format!("ws://{}:{}", self.host, self.port)
	}
}

impl Default for ObsConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 4455,
			password: String::new(),
			revision: ProtocolRevision::Current,
		}
	}
}

impl std::fmt::Debug for ObsConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ObsConfig")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("password", &"[REDACTED]")
			.field("revision", &self.revision)
			.finish()
	}
}
