use crate::{Error, Result};
use clap::Parser;
use obs_websocket::{ObsConfig, ProtocolRevision};

/// Local address the OSC sender binds before sending to the VR client.
pub const OSC_SENDER_BIND: &str = "0.0.0.0:0";

#[derive(Parser, Clone)]
#[command(name = "obs-osc")]
#[command(about = "Mirrors OBS stream and scene state onto VRChat avatar parameters", long_about = None)]
pub struct Config {
	/// OBS WebSocket protocol revision (4 or 5)
	#[arg(long, env = "OBS_VERSION", default_value = "5")]
	pub obs_version: ProtocolRevision,

	/// OBS WebSocket host
	#[arg(long, env = "OBS_HOST", default_value = "127.0.0.1")]
	pub obs_host: String,

	/// OBS WebSocket port
	#[arg(long, env = "OBS_PORT", default_value = "4455")]
	pub obs_port: u16,

	/// OBS WebSocket password
	#[arg(long, env = "OBS_PASSWORD", default_value = "", hide_env_values = true)]
	pub obs_password: String,

	/// Host the VR client listens for OSC on
	#[arg(long, env = "OSC_CLIENT_HOST", default_value = "127.0.0.1")]
	pub osc_client_host: String,

	/// Port the VR client listens for OSC on
	#[arg(long, env = "OSC_CLIENT_PORT", default_value = "9000")]
	pub osc_client_port: u16,

	/// Address to receive avatar parameter writes on
	#[arg(long, env = "OSC_SERVER_HOST", default_value = "0.0.0.0")]
	pub osc_server_host: String,

	/// Port to receive avatar parameter writes on
	#[arg(long, env = "OSC_SERVER_PORT", default_value = "9001")]
	pub osc_server_port: u16,

	/// Emit logs as JSON
	#[arg(long, env = "LOG_JSON")]
	pub log_json: bool,
}

impl Config {
	pub fn validate(&self) -> Result<()> {
		let ports = [("obs_port", self.obs_port), ("osc_client_port", self.osc_client_port), ("osc_server_port", self.osc_server_port)];
		if let Some((name, _)) = ports.iter().find(|(_, port)| *port == 0) {
			return Err(Error::Config(format!("{name} must be greater than 0")));
		}

		if self.obs_host.trim().is_empty() || self.osc_client_host.trim().is_empty() || self.osc_server_host.trim().is_empty() {
			return Err(Error::Config("hosts must not be empty".to_string()));
		}

		Ok(())
	}

	pub fn obs(&self) -> ObsConfig {
		ObsConfig::new(self.obs_host.clone(), self.obs_port, self.obs_password.clone(), self.obs_version)
	}

	pub fn osc_client_addr(&self) -> String {
		format!("{}:{}", self.osc_client_host, self.osc_client_port)
	}

	pub fn osc_server_addr(&self) -> String {
		format!("{}:{}", self.osc_server_host, self.osc_server_port)
	}
}
