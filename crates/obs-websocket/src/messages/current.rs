use super::{DecodeError, Incoming, JsonExtractor, RequestFailure};
use crate::{ProtocolMismatchError, ProtocolRevision, RawEvent};
use serde_json::{json, Map, Value};

const CONTEXT: &str = "5.x message";

/// 5.x operation codes this crate uses.
mod op {
	pub const HELLO: u64 = 0;
	pub const IDENTIFY: u64 = 1;
	pub const IDENTIFIED: u64 = 2;
	pub const EVENT: u64 = 5;
	pub const REQUEST: u64 = 6;
	pub const REQUEST_RESPONSE: u64 = 7;
}

const RPC_VERSION: u64 = 1;

/// `EventSubscription::Scenes | EventSubscription::Outputs`
pub(crate) const EVENT_SUBSCRIPTIONS: u64 = (1 << 2) | (1 << 6);

pub(super) fn encode_request(request_id: &str, request_type: &str, request_data: Option<Value>) -> Value {
	let mut d = Map::new();
	d.insert("requestType".to_string(), Value::from(request_type));
	d.insert("requestId".to_string(), Value::from(request_id));

	if let Some(data) = request_data {
		d.insert("requestData".to_string(), data);
	}

	json!({ "op": op::REQUEST, "d": d })
}

/// `Identify` frame, with the challenge answer when OBS asked for one.
#[cfg_attr(not(feature = "websocket"), allow(dead_code))]
pub(crate) fn identify(authentication: Option<String>) -> Value {
	let mut d = Map::new();
	d.insert("rpcVersion".to_string(), Value::from(RPC_VERSION));
	d.insert("eventSubscriptions".to_string(), Value::from(EVENT_SUBSCRIPTIONS));

	if let Some(auth) = authentication {
		d.insert("authentication".to_string(), Value::from(auth));
	}

	json!({ "op": op::IDENTIFY, "d": d })
}

pub(super) fn decode(json: Value) -> Result<Incoming, DecodeError> {
	let extractor = JsonExtractor::new(&json, CONTEXT);
	let op_code = json.get("op").ok_or(DecodeError::ForeignRevision(ProtocolRevision::Legacy))?;
	let op_code = op_code.as_u64().ok_or_else(|| ProtocolMismatchError::invalid_type(CONTEXT, "op", "number"))?;
	let d = extractor.get_object("d")?;

	match op_code {
		op::HELLO => Ok(Incoming::Hello(Value::Object(d.clone()))),
		op::IDENTIFIED => Ok(Incoming::Identified),
		op::EVENT => {
			let d = Value::Object(d.clone());
			let event = JsonExtractor::new(&d, "5.x event");
			let event_type = event.get_str("eventType")?;
			let data = d.get("eventData").cloned().unwrap_or_else(|| Value::Object(Map::new()));
			Ok(Incoming::Event(RawEvent::new(event_type, data)))
		}
		op::REQUEST_RESPONSE => decode_response(&Value::Object(d.clone())).map_err(DecodeError::from),
		other => Ok(Incoming::Ignored(format!("op {other}"))),
	}
}

fn decode_response(d: &Value) -> Result<Incoming, ProtocolMismatchError> {
	let response = JsonExtractor::new(d, "5.x request response");
	let id = response.get_str("requestId")?.to_string();
	let status = response.get_object("requestStatus")?;

	let succeeded = status
		.get("result")
		.and_then(Value::as_bool)
		.ok_or_else(|| ProtocolMismatchError::missing_field("5.x request status", "result"))?;

	let outcome = if succeeded {
		Ok(d.get("responseData").cloned().unwrap_or_else(|| Value::Object(Map::new())))
	} else {
		Err(RequestFailure {
			code: status.get("code").and_then(Value::as_i64),
			comment: status.get("comment").and_then(Value::as_str).unwrap_or("no comment").to_string(),
		})
	};

	Ok(Incoming::Response { id, outcome })
}
