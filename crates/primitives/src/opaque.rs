use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serializer;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Reference to a live host object (a callable, a socket, a lock guard) that has
/// no structured representation.
///
/// Values holding a handle are valid inputs to every clone entry point, but any
/// structured primitive rejects them while serializing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueHandle {
	type_name: Cow<'static, str>,
	id: u64,
}

impl OpaqueHandle {
	/// Creates a handle for a host object of the given type.
	pub fn new(type_name: impl Into<Cow<'static, str>>) -> Self {
		Self {
			type_name: type_name.into(),
			id: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
		}
	}

	/// Host type name used in error messages.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Process-unique handle id.
	pub const fn id(&self) -> u64 {
		self.id
	}
}

pub(crate) fn reject<S: Serializer>(handle: &OpaqueHandle, _serializer: S) -> Result<S::Ok, S::Error> {
	Err(serde::ser::Error::custom(format_args!("{} object could not be cloned", handle.type_name)))
}
