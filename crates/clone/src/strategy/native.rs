use async_trait::async_trait;
use dolly_host::Host;
use dolly_primitives::Value;

use super::{Cloner, StrategyKind};
use crate::Result;

/// Calls the host's structured clone directly. No boundary, no correlation.
pub struct NativeCloner {
	host: Host,
}

impl NativeCloner {
	/// Clones through `host`.
	pub fn new(host: Host) -> Self {
		Self { host }
	}
}

#[async_trait]
impl Cloner for NativeCloner {
	fn kind(&self) -> StrategyKind {
		StrategyKind::Native
	}

	fn is_inherently_synchronous(&self) -> bool {
		true
	}

	fn clone_sync(&self, value: &Value) -> Result<Value> {
		Ok(self.host.structured_clone(value)?)
	}
}
