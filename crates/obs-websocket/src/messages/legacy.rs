use super::{DecodeError, Incoming, JsonExtractor, RequestFailure};
use crate::{ProtocolMismatchError, ProtocolRevision, RawEvent};
use serde_json::{Map, Value};

const CONTEXT: &str = "4.x message";

/// 4.x requests are flat objects; parameters sit next to the request type.
pub(super) fn encode_request(request_id: &str, request_type: &str, request_data: Option<Value>) -> Value {
	let mut frame = Map::new();
	frame.insert("request-type".to_string(), Value::from(request_type));
	frame.insert("message-id".to_string(), Value::from(request_id));

	if let Some(Value::Object(params)) = request_data {
		frame.extend(params);
	}

	Value::Object(frame)
}

pub(super) fn decode(json: Value) -> Result<Incoming, DecodeError> {
	if json.get("op").is_some() {
		return Err(DecodeError::ForeignRevision(ProtocolRevision::Current));
	}

	if let Some(event_type) = json.get("update-type").and_then(Value::as_str) {
		return Ok(Incoming::Event(RawEvent::new(event_type, json.clone())));
	}

	let extractor = JsonExtractor::new(&json, CONTEXT);
	let id = extractor.get_str("message-id")?.to_string();
	let status = extractor.get_str("status")?;

	let outcome = match status {
		"ok" => Ok(json.clone()),
		"error" => Err(RequestFailure {
			code: None,
			comment: json.get("error").and_then(Value::as_str).unwrap_or("unknown error").to_string(),
		}),
		other => return Err(ProtocolMismatchError::new(CONTEXT, format!("unknown status '{other}'")).into()),
	};

	Ok(Incoming::Response { id, outcome })
}
