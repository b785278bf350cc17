use crate::{OscError, OscMessage, OscValue, ParameterSource, Result};
use rosc::{decoder, OscPacket};
use std::collections::VecDeque;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info, trace, warn};

/// Inbound OSC endpoint.
///
/// Bundles are flattened in order. Datagrams that fail to decode and
/// messages without a usable first argument are dropped.
pub struct OscListener {
	socket: UdpSocket,
	buf: Vec<u8>,
	queued: VecDeque<OscMessage>,
}

impl OscListener {
	pub async fn bind(addr: &str) -> Result<Self> {
		let socket = UdpSocket::bind(addr).await.map_err(|source| OscError::Bind {
			addr: addr.to_string(),
			source,
		})?;

		info!(addr = %socket.local_addr()?, "OSC listener bound");
		Ok(Self {
			socket,
			buf: vec![0; decoder::MTU],
			queued: VecDeque::new(),
		})
	}

	pub fn local_addr(&self) -> Result<SocketAddr> {
		Ok(self.socket.local_addr()?)
	}

	pub async fn recv(&mut self) -> Result<OscMessage> {
		loop {
			if let Some(message) = self.queued.pop_front() {
				return Ok(message);
			}

			let (len, peer) = self.socket.recv_from(&mut self.buf).await?;
			match decoder::decode_udp(&self.buf[..len]) {
				Ok((_, packet)) => flatten(packet, &mut self.queued),
				Err(e) => warn!(%peer, len, error = ?e, "dropping malformed OSC datagram"),
			}
		}
	}
}

#[async_trait::async_trait]
impl ParameterSource for OscListener {
	async fn recv(&mut self) -> Result<OscMessage> {
		Self::recv(self).await
	}
}

fn flatten(packet: OscPacket, out: &mut VecDeque<OscMessage>) {
	match packet {
		OscPacket::Message(message) => match message.args.first().and_then(OscValue::from_osc) {
			Some(value) => {
				trace!(path = %message.addr, %value, "OSC message");
				out.push_back(OscMessage { path: message.addr, value });
			}
			None => debug!(path = %message.addr, args = ?message.args, "OSC message without a usable value"),
		},
		OscPacket::Bundle(bundle) => {
			for packet in bundle.content {
				flatten(packet, out);
			}
		}
	}
}
