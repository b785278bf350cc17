//! Session handshake for both protocol revisions.
//!
//! 4.x: `GetAuthRequired`, then `Authenticate` when a challenge is returned.
//! 5.x: `Hello` → `Identify` → `Identified`.
//! Both revisions answer the challenge with the same salted SHA-256 scheme.

use crate::messages::{self, DecodeError, Incoming, JsonExtractor};
use crate::{ConnectionError, ProtocolRevision};
use base64::engine::{general_purpose::STANDARD as BASE64_STANDARD, Engine};
use futures_util::{
	sink::SinkExt,
	stream::{SplitSink, SplitStream, StreamExt},
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::protocol::Message as TungsteniteMessage, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument, warn};

pub(crate) type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, TungsteniteMessage>;
pub(crate) type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// 5.x close code sent when the `Identify` authentication string is wrong.
const CLOSE_AUTHENTICATION_FAILED: u16 = 4009;
/// 5.x close code sent when a 4.x style request arrives before `Identify`.
const CLOSE_NOT_IDENTIFIED: u16 = 4007;

const LEGACY_AUTH_REQUIRED_ID: &str = "auth-required";
const LEGACY_AUTHENTICATE_ID: &str = "authenticate";

/// `base64(sha256(base64(sha256(password + salt)) + challenge))`
pub(crate) fn auth_response(password: &str, salt: &str, challenge: &str) -> String {
	let secret = BASE64_STANDARD.encode(Sha256::digest(format!("{password}{salt}").as_bytes()));
	BASE64_STANDARD.encode(Sha256::digest(format!("{secret}{challenge}").as_bytes()))
}

/// Runs the revision's handshake on a freshly opened socket.
#[instrument(skip(password, sink, stream))]
pub(crate) async fn handshake(revision: ProtocolRevision, password: &str, sink: &mut WsSink, stream: &mut WsSource) -> Result<(), ConnectionError> {
	let exchange = async {
		match revision {
			ProtocolRevision::Legacy => legacy_handshake(password, sink, stream).await,
			ProtocolRevision::Current => current_handshake(password, sink, stream).await,
		}
	};

	tokio::time::timeout(HANDSHAKE_TIMEOUT, exchange).await.map_err(|_| ConnectionError::Timeout(HANDSHAKE_TIMEOUT))?
}

async fn current_handshake(password: &str, sink: &mut WsSink, stream: &mut WsSource) -> Result<(), ConnectionError> {
	let hello = match next_incoming(ProtocolRevision::Current, stream).await? {
		Incoming::Hello(hello) => hello,
		other => return Err(ConnectionError::Handshake(format!("expected Hello, got {other:?}"))),
	};

	let obs_version = hello.get("obsWebSocketVersion").and_then(Value::as_str).unwrap_or("unknown");
	debug!(obs_version, "received Hello");

	let authentication = match hello.get("authentication") {
		Some(challenge) => {
			let extractor = JsonExtractor::new(challenge, "Hello authentication");
			let salt = extractor.get_str("salt")?;
			let challenge = extractor.get_str("challenge")?;
			if password.is_empty() {
				warn!("OBS requires authentication but no password is configured");
			}
			Some(auth_response(password, salt, challenge))
		}
		None => None,
	};

	send_json(sink, &messages::identify(authentication)).await?;

	match next_incoming(ProtocolRevision::Current, stream).await? {
		Incoming::Identified => {
			info!(obs_version, "identified with OBS WebSocket 5.x");
			Ok(())
		}
		other => Err(ConnectionError::Handshake(format!("expected Identified, got {other:?}"))),
	}
}

async fn legacy_handshake(password: &str, sink: &mut WsSink, stream: &mut WsSource) -> Result<(), ConnectionError> {
	send_json(sink, &messages::encode_request(ProtocolRevision::Legacy, LEGACY_AUTH_REQUIRED_ID, "GetAuthRequired", None)).await?;
	let auth_info = legacy_response(stream, LEGACY_AUTH_REQUIRED_ID).await?.map_err(ConnectionError::Handshake)?;

	let extractor = JsonExtractor::new(&auth_info, "GetAuthRequired response");
	if !extractor.get_bool("authRequired")? {
		info!("connected to OBS WebSocket 4.x without authentication");
		return Ok(());
	}

	let auth = auth_response(password, extractor.get_str("salt")?, extractor.get_str("challenge")?);
	let request = messages::encode_request(ProtocolRevision::Legacy, LEGACY_AUTHENTICATE_ID, "Authenticate", Some(json!({ "auth": auth })));
	send_json(sink, &request).await?;

	legacy_response(stream, LEGACY_AUTHENTICATE_ID).await?.map_err(ConnectionError::AuthenticationFailed)?;
	info!("authenticated with OBS WebSocket 4.x");
	Ok(())
}

/// Waits for the 4.x response with `id`, skipping any events pushed meanwhile.
async fn legacy_response(stream: &mut WsSource, id: &str) -> Result<Result<Value, String>, ConnectionError> {
	loop {
		match next_incoming(ProtocolRevision::Legacy, stream).await? {
			Incoming::Response { id: response_id, outcome } if response_id == id => {
				return Ok(outcome.map_err(|failure| failure.comment));
			}
			other => debug!(?other, "skipping frame during handshake"),
		}
	}
}

async fn send_json(sink: &mut WsSink, frame: &Value) -> Result<(), ConnectionError> {
	sink.send(TungsteniteMessage::Text(frame.to_string().into())).await.map_err(|e| ConnectionError::Send(e.to_string()))
}

async fn next_incoming(revision: ProtocolRevision, stream: &mut WsSource) -> Result<Incoming, ConnectionError> {
	while let Some(msg) = stream.next().await {
		match msg {
			Ok(TungsteniteMessage::Text(text)) => {
				return messages::decode(revision, text.as_str()).map_err(|e| revision_mismatch(revision, e));
			}
			Ok(TungsteniteMessage::Close(frame)) => {
				let (code, reason) = frame.map_or((None, String::new()), |f| (Some(u16::from(f.code)), f.reason.to_string()));
				return Err(match code {
					Some(CLOSE_AUTHENTICATION_FAILED) => ConnectionError::AuthenticationFailed(reason),
					Some(CLOSE_NOT_IDENTIFIED) if revision == ProtocolRevision::Legacy => ConnectionError::RevisionMismatch {
						expected: revision,
						detail: "server closed the session with 5.x code NotIdentified".to_string(),
					},
					_ => ConnectionError::Closed { code, reason },
				});
			}
			Ok(_) => continue,
			Err(e) => return Err(ConnectionError::Handshake(e.to_string())),
		}
	}

	Err(ConnectionError::Closed {
		code: None,
		reason: "stream ended".to_string(),
	})
}

/// A frame from the other revision means the configured revision is wrong.
fn revision_mismatch(revision: ProtocolRevision, error: DecodeError) -> ConnectionError {
	match error {
		foreign @ DecodeError::ForeignRevision(_) => ConnectionError::RevisionMismatch {
			expected: revision,
			detail: foreign.to_string(),
		},
		DecodeError::Malformed(error) => ConnectionError::Protocol(error),
	}
}
