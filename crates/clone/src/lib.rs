//! Native structured clone.
//!
//! Deep-copies a [`Value`] using whatever cloning primitive the host offers, without
//! a hand-written copier. Host facilities are probed once per call mode and the
//! best viable strategy is kept for the life of the process:
//! * synchronous: the host's direct structured clone
//! * asynchronous: a private message channel, then the shared event bus, then an
//!   object store transaction that is never committed
//!
//! ```no_run
//! use dolly_clone::Value;
//!
//! # async fn demo() -> dolly_clone::Result<()> {
//! let original = Value::object([("a", Value::from(vec![Value::from(1), Value::Null]))]);
//! let copy = dolly_clone::clone_async(&original).await?;
//! assert_eq!(copy, original);
//! # Ok(())
//! # }
//! ```
//!
//! Custom rankings are built with [`Registry`] and either used directly through a
//! [`Selection`] or installed process-wide with [`install`] before first use.

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod registry;
mod selection;
pub mod strategy;

pub use config::CloneConfig;
pub use dolly_primitives::{Map, OpaqueHandle, Value};
pub use error::{CloneError, ConfigError, Result};
pub use registry::{Registry, StrategyDescriptor};
pub use selection::{Selection, install, selection};
pub use strategy::{BusCloner, ChannelCloner, Cloner, NativeCloner, StoreCloner, StrategyKind};

/// Deep-copies `value` without suspending.
///
/// Fails with [`CloneError::Unavailable`] if no synchronous strategy exists, or
/// with the primitive's own error if `value` cannot be cloned.
pub fn clone_sync(value: &Value) -> Result<Value> {
	selection().clone_sync(value)
}

/// Deep-copies `value`, completing after the value has crossed the selected
/// boundary. The future is never ready on its first poll.
///
/// Fails with [`CloneError::Unavailable`] if neither call mode has a strategy.
pub async fn clone_async(value: &Value) -> Result<Value> {
	selection().clone_async(value).await
}

/// Returns true if [`clone_sync`] has a strategy. Stable for the process lifetime.
pub fn can_clone_sync() -> bool {
	selection().can_clone_sync()
}

/// Returns true if an asynchronous strategy was selected, not counting the
/// synchronous fallback. Stable for the process lifetime.
pub fn can_clone_async() -> bool {
	selection().can_clone_async()
}
