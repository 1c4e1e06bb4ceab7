//! Clone and configuration errors.

use std::path::PathBuf;

use dolly_correlate::Disconnected;
use dolly_host::{DataCloneError, PortError, StoreError};
use thiserror::Error;

use crate::StrategyKind;

/// Errors surfaced by the clone entry points.
///
/// Everything except [`CloneError::Unavailable`] and [`CloneError::Unsupported`] is a
/// failure of the selected primitive, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneError {
	/// No capability probe succeeded for the requested call mode.
	#[error("no native structured clone implementation available")]
	Unavailable,

	/// The strategy cannot operate synchronously.
	#[error("{strategy} strategy cannot clone synchronously")]
	Unsupported {
		/// The strategy that was asked.
		strategy: StrategyKind,
	},

	/// The value has no structured representation.
	#[error(transparent)]
	DataClone(#[from] DataCloneError),

	/// The message port boundary failed.
	#[error(transparent)]
	Port(#[from] PortError),

	/// The object store boundary failed.
	#[error(transparent)]
	Store(#[from] StoreError),

	/// The strategy was torn down while a reply was pending.
	#[error(transparent)]
	Disconnected(#[from] Disconnected),
}

/// Result type for clone operations.
pub type Result<T> = std::result::Result<T, CloneError>;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or structure.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A strategy name in an environment override is not known.
	#[error("unknown strategy: {0}")]
	UnknownStrategy(String),
}
