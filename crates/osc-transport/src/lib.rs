//! OSC over UDP for avatar parameters.
//!
//! [`OscSender`] pushes one message per datagram to the VR client and
//! [`OscListener`] yields the parameter writes it sends back. The bridge
//! only talks to the [`ParameterSink`] / [`ParameterSource`] seams.

mod error;
mod listener;
mod sender;
mod traits;
mod value;

pub use error::{OscError, Result};
pub use listener::OscListener;
pub use sender::OscSender;
pub use traits::{ParameterSink, ParameterSource};
pub use value::{OscMessage, OscValue};
