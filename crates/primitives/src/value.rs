use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::OpaqueHandle;

/// Insertion-ordered property map of an object value.
pub type Map = IndexMap<String, Value>;

/// Dynamically typed value graph moved across clone boundaries.
///
/// Every variant except [`Value::Opaque`] has a structured representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// Absent value.
	#[default]
	Undefined,
	/// Explicit null.
	Null,
	/// Boolean.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Double-precision float.
	Float(f64),
	/// UTF-8 text.
	String(String),
	/// Raw binary buffer.
	Bytes(Vec<u8>),
	/// Ordered list.
	Array(Vec<Value>),
	/// Property map in insertion order.
	Object(Map),
	/// Live host object; rejected by every structured primitive.
	#[serde(serialize_with = "crate::opaque::reject", skip_deserializing)]
	Opaque(OpaqueHandle),
}

impl Value {
	/// Builds an object value from key/value pairs, preserving their order.
	pub fn object<K, I>(entries: I) -> Self
	where
		K: Into<String>,
		I: IntoIterator<Item = (K, Value)>,
	{
		Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}

	/// Short type label used in logs.
	pub const fn type_name(&self) -> &'static str {
		match self {
			Self::Undefined => "undefined",
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Float(_) => "float",
			Self::String(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::Array(_) => "array",
			Self::Object(_) => "object",
			Self::Opaque(_) => "opaque",
		}
	}

	/// Returns `true` for arrays and objects.
	pub const fn is_composite(&self) -> bool {
		matches!(self, Self::Array(_) | Self::Object(_))
	}

	/// Looks up a property of an object value.
	pub fn get(&self, key: &str) -> Option<&Value> {
		match self {
			Self::Object(map) => map.get(key),
			_ => None,
		}
	}

	/// Borrows the text of a string value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	/// Borrows the items of an array value.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Borrows the properties of an object value.
	pub fn as_object(&self) -> Option<&Map> {
		match self {
			Self::Object(map) => Some(map),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Self::Int(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Self::Int(i64::from(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::String(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::String(v)
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Self::Array(v)
	}
}

impl From<Map> for Value {
	fn from(v: Map) -> Self {
		Self::Object(v)
	}
}

impl From<OpaqueHandle> for Value {
	fn from(v: OpaqueHandle) -> Self {
		Self::Opaque(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map_or(Self::Null, Into::into)
	}
}
