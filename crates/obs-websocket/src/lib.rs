// obs-websocket Library
//
// Revision-independent control of OBS over its remote-control WebSocket.
// The 4.x ("legacy") and 5.x ("current") protocols differ in request names,
// response field names, event names and framing; everything revision-specific
// is resolved once when a `ControlFacade` is built and never leaks past it.

mod config;
mod core;
mod events;
mod facade;
#[cfg_attr(not(feature = "websocket"), allow(dead_code))]
mod messages;
mod revision;

#[cfg(feature = "websocket")]
mod auth;

pub use config::ObsConfig;
#[cfg(feature = "websocket")]
pub use crate::core::ObsConnection;
pub use crate::core::{CallError, ConnectionError, ObsTransport, ProtocolMismatchError, RawEvent};
pub use events::{ObsEvent, ObsEventReceiver, OUTPUT_STARTING, OUTPUT_STOPPING};
pub use facade::ControlFacade;
pub use revision::{ProtocolRevision, UnknownRevision};
