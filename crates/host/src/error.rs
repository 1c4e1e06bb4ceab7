//! Host facility errors.

use thiserror::Error;

/// A value has no structured representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not clone value: {message}")]
pub struct DataCloneError {
	message: String,
}

impl DataCloneError {
	/// Creates an error with the given reason.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}

	/// Reason reported by the serializer.
	pub fn message(&self) -> &str {
		&self.message
	}
}

impl From<rmp_serde::encode::Error> for DataCloneError {
	fn from(err: rmp_serde::encode::Error) -> Self {
		Self::new(err.to_string())
	}
}

impl From<rmp_serde::decode::Error> for DataCloneError {
	fn from(err: rmp_serde::decode::Error) -> Self {
		Self::new(err.to_string())
	}
}

/// Errors from posting to or starting a message port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
	/// `start` was called twice on the same port.
	#[error("message port already started")]
	AlreadyStarted,
	/// The entangled port was dropped.
	#[error("message port closed")]
	Closed,
	/// The message could not be serialized.
	#[error(transparent)]
	DataClone(#[from] DataCloneError),
}

/// Errors from the object store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	/// The named object store does not exist in the database.
	#[error("object store not found: {store}")]
	NotFound {
		/// Requested store name.
		store: String,
	},
	/// The database exists at a newer version than requested.
	#[error("database {name} is at version {current}, cannot open at {requested}")]
	Version {
		/// Database name.
		name: String,
		/// Requested version.
		requested: u32,
		/// Current version.
		current: u32,
	},
	/// The open request was dropped by the host loop.
	#[error("failed to open database {name}: {reason}")]
	Open {
		/// Database name.
		name: String,
		/// Failure reason.
		reason: String,
	},
	/// A record could not be serialized or read back.
	#[error(transparent)]
	DataClone(#[from] DataCloneError),
}
