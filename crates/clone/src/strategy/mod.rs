//! Clone strategies: one adapter per host primitive.
//!
//! Strategies differ only in how they move a value across a boundary and read it
//! back. The boundary-based ones correlate replies through a
//! [`dolly_correlate::Multiplexer`].

mod bus;
mod channel;
mod native;
mod store;

use async_trait::async_trait;
pub use bus::BusCloner;
pub use channel::ChannelCloner;
use dolly_primitives::Value;
pub use native::NativeCloner;
use serde::Deserialize;
pub use store::StoreCloner;

use crate::{CloneError, Result};

/// Identifies one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum::Display, strum::EnumString, strum::IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StrategyKind {
	/// Direct in-process structured clone.
	Native,
	/// Round trip through a private pair of message ports.
	MessageChannel,
	/// Round trip through the process-wide event bus.
	EventBus,
	/// Insert and read back inside an aborted object store transaction.
	ObjectStore,
}

impl StrategyKind {
	/// Returns the kebab-case name.
	pub fn as_str(self) -> &'static str {
		self.into()
	}
}

/// One concrete way of performing a structured clone.
#[async_trait]
pub trait Cloner: Send + Sync {
	/// Which strategy this is.
	fn kind(&self) -> StrategyKind;

	/// Whether [`clone_sync`](Self::clone_sync) can succeed without suspending.
	fn is_inherently_synchronous(&self) -> bool {
		false
	}

	/// Clones without suspending.
	fn clone_sync(&self, value: &Value) -> Result<Value> {
		let _ = value;
		Err(CloneError::Unsupported { strategy: self.kind() })
	}

	/// Clones, suspending until the value has crossed the boundary.
	///
	/// The returned future must never be ready on its first poll, however fast the
	/// boundary answers. The default yields once and then wraps
	/// [`clone_sync`](Self::clone_sync).
	async fn clone_async(&self, value: &Value) -> Result<Value> {
		tokio::task::yield_now().await;
		self.clone_sync(value)
	}
}

/// Stands in for a strategy whose constructor failed after its probe succeeded.
///
/// Every call reports the construction error; selection never moves on to another
/// candidate.
pub(crate) struct FailedCloner {
	pub(crate) kind: StrategyKind,
	pub(crate) error: CloneError,
}

#[async_trait]
impl Cloner for FailedCloner {
	fn kind(&self) -> StrategyKind {
		self.kind
	}

	fn clone_sync(&self, _value: &Value) -> Result<Value> {
		Err(self.error.clone())
	}

	async fn clone_async(&self, _value: &Value) -> Result<Value> {
		tokio::task::yield_now().await;
		Err(self.error.clone())
	}
}
