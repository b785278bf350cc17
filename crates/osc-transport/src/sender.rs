use crate::{OscError, OscValue, ParameterSink, Result};
use rosc::{encoder, OscPacket};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info, instrument};

/// Outbound OSC endpoint. One datagram per parameter write.
pub struct OscSender {
	socket: UdpSocket,
	target: SocketAddr,
}

impl OscSender {
	/// Binds `local` and resolves `target` once.
	pub async fn bind(local: &str, target: &str) -> Result<Self> {
		let socket = UdpSocket::bind(local).await.map_err(|source| OscError::Bind {
			addr: local.to_string(),
			source,
		})?;
		let target = tokio::net::lookup_host(target)
			.await?
			.next()
			.ok_or_else(|| OscError::Resolve(target.to_string()))?;

		info!(%target, "OSC sender ready");
		Ok(Self { socket, target })
	}

	pub const fn target(&self) -> SocketAddr {
		self.target
	}

	#[instrument(skip(self), fields(target = %self.target))]
	pub async fn send(&self, path: &str, value: OscValue) -> Result<()> {
		let packet = OscPacket::Message(rosc::OscMessage {
			addr: path.to_string(),
			args: vec![value.into()],
		});
		let bytes = encoder::encode(&packet).map_err(|e| OscError::Encode(format!("{e:?}")))?;

		self.socket.send_to(&bytes, self.target).await?;
		debug!("sent");
		Ok(())
	}
}

#[async_trait::async_trait]
impl ParameterSink for OscSender {
	async fn send(&self, path: &str, value: OscValue) -> Result<()> {
		Self::send(self, path, value).await
	}
}
