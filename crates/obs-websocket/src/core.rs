mod error;
mod transport;

#[cfg(feature = "websocket")]
mod connection;

#[cfg(feature = "websocket")]
pub use connection::ObsConnection;
pub use error::{CallError, ConnectionError, ProtocolMismatchError};
pub use transport::{ObsTransport, RawEvent};
