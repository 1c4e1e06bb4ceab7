//! Structured serialization shared by every boundary.
//!
//! Messages are encoded to MessagePack when they cross a boundary and decoded on
//! the receiving side, so the receiver always owns a fresh value graph. Structs are
//! encoded with their field names, so a receiver decoding an unrelated message as a
//! struct fails instead of misreading it.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{DataCloneError, Value};

/// Encodes a message for transfer.
pub fn serialize<T: Serialize + ?Sized>(message: &T) -> Result<Vec<u8>, DataCloneError> {
	Ok(rmp_serde::to_vec_named(message)?)
}

/// Decodes a transferred message.
pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DataCloneError> {
	Ok(rmp_serde::from_slice(bytes)?)
}

/// Synchronous in-process structured clone.
pub fn structured_clone(value: &Value) -> Result<Value, DataCloneError> {
	deserialize(&serialize(value)?)
}

#[cfg(test)]
mod tests {
	use dolly_primitives::OpaqueHandle;
	use pretty_assertions::assert_eq;

	use super::*;

	fn sample() -> Value {
		Value::object([
			("undefined", Value::Undefined),
			("null", Value::Null),
			("flag", Value::from(true)),
			("int", Value::from(-7)),
			("float", Value::from(1.5)),
			("text", Value::from("hi")),
			("bytes", Value::Bytes(vec![0, 255, 3])),
			("list", Value::from(vec![Value::from(1), Value::Null])),
			("nested", Value::object([("z", Value::from("last")), ("a", Value::from("first"))])),
		])
	}

	#[test]
	fn clone_preserves_every_structured_variant() {
		let original = sample();
		assert_eq!(structured_clone(&original), Ok(original));
	}

	#[test]
	fn clone_allocates_fresh_buffers() {
		let original = Value::from(vec![Value::from("a")]);
		let copy = structured_clone(&original).unwrap();
		let (Value::Array(a), Value::Array(b)) = (&original, &copy) else {
			panic!("expected arrays");
		};
		assert!(!std::ptr::eq(a.as_ptr(), b.as_ptr()));
	}

	#[test]
	fn opaque_values_are_rejected_with_type_name() {
		let value = Value::object([("callback", Value::from(OpaqueHandle::new("Function")))]);
		let err = structured_clone(&value).unwrap_err();
		assert!(err.message().contains("Function object could not be cloned"), "got: {err}");
	}

	#[test]
	fn truncated_input_fails_to_decode() {
		let bytes = serialize(&sample()).unwrap();
		assert!(deserialize::<Value>(&bytes[..bytes.len() / 2]).is_err());
	}
}
