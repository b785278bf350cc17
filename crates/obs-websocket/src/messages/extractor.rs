use crate::ProtocolMismatchError;
use serde_json::{Map, Value};

type Result<T> = std::result::Result<T, ProtocolMismatchError>;

/// Typed field access on a JSON object, reporting failures against a context label.
pub(crate) struct JsonExtractor<'a> {
	value: &'a Value,
	context: &'a str,
}

impl<'a> JsonExtractor<'a> {
	pub const fn new(value: &'a Value, context: &'a str) -> Self {
		Self { value, context }
	}

	fn field(&self, field: &str) -> Result<&'a Value> {
		self.value.get(field).ok_or_else(|| ProtocolMismatchError::missing_field(self.context, field))
	}

	pub fn get_str(&self, field: &str) -> Result<&'a str> {
		self.field(field)?.as_str().ok_or_else(|| ProtocolMismatchError::invalid_type(self.context, field, "string"))
	}

	pub fn get_bool(&self, field: &str) -> Result<bool> {
		self.field(field)?.as_bool().ok_or_else(|| ProtocolMismatchError::invalid_type(self.context, field, "boolean"))
	}

	pub fn get_array(&self, field: &str) -> Result<&'a Vec<Value>> {
		self.field(field)?.as_array().ok_or_else(|| ProtocolMismatchError::invalid_type(self.context, field, "array"))
	}

	pub fn get_object(&self, field: &str) -> Result<&'a Map<String, Value>> {
		self.field(field)?.as_object().ok_or_else(|| ProtocolMismatchError::invalid_type(self.context, field, "object"))
	}
}
