use rosc::OscType;
use std::fmt;

/// A single avatar parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OscValue {
	Int(i32),
	Float(f32),
	Bool(bool),
}

impl OscValue {
	/// Truthiness as the VR client sees it: any non-zero number is on.
	pub fn as_bool(self) -> bool {
		match self {
			Self::Int(i) => i != 0,
			Self::Float(f) => f.abs() > 0.0,
			Self::Bool(b) => b,
		}
	}

	/// Integer view for index-like parameters. Fractional floats and bools have none.
	#[allow(clippy::cast_possible_truncation)]
	pub fn as_index(self) -> Option<i32> {
		match self {
			Self::Int(i) => Some(i),
			Self::Float(f) => {
				let f = f64::from(f);
				let integral = f.fract().abs() < f64::EPSILON;
				let in_range = (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&f);
				(integral && in_range).then_some(f as i32)
			}
			Self::Bool(_) => None,
		}
	}

	pub(crate) fn from_osc(arg: &OscType) -> Option<Self> {
		match *arg {
			OscType::Int(i) => Some(Self::Int(i)),
			OscType::Float(f) => Some(Self::Float(f)),
			OscType::Bool(b) => Some(Self::Bool(b)),
			_ => None,
		}
	}
}

impl From<OscValue> for OscType {
	fn from(value: OscValue) -> Self {
		match value {
			OscValue::Int(i) => Self::Int(i),
			OscValue::Float(f) => Self::Float(f),
			OscValue::Bool(b) => Self::Bool(b),
		}
	}
}

impl From<bool> for OscValue {
	fn from(b: bool) -> Self {
		Self::Int(i32::from(b))
	}
}

impl From<i32> for OscValue {
	fn from(i: i32) -> Self {
		Self::Int(i)
	}
}

impl fmt::Display for OscValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(i) => write!(f, "{i}"),
			Self::Float(v) => write!(f, "{v}"),
			Self::Bool(b) => write!(f, "{b}"),
		}
	}
}

/// A parameter write received from the VR client.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
	pub path: String,
	pub value: OscValue,
}

impl OscMessage {
	pub fn new(path: impl Into<String>, value: impl Into<OscValue>) -> Self {
		Self {
			path: path.into(),
			value: value.into(),
		}
	}
}
