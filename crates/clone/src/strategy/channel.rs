use std::sync::Arc;

use async_trait::async_trait;
use dolly_correlate::{CounterKeyGen, Multiplexer, Outgoing};
use dolly_host::{Host, MessageChannel, MessagePort, PortError};
use dolly_primitives::Value;

use super::{Cloner, StrategyKind};
use crate::Result;

/// `(key, value)` as it travels between the two ports.
type Envelope = (u64, Value);

struct PortSide(MessagePort<Envelope>);

impl<'a> Outgoing<u64, &'a Value> for PortSide {
	type Error = PortError;

	fn transmit(&self, key: &u64, value: &'a Value) -> std::result::Result<(), PortError> {
		self.0.post(&(*key, value))
	}
}

/// Clones by posting through one port of a private channel and waiting for the
/// copy to arrive on the other.
///
/// The channel is owned exclusively, so plain counter keys suffice.
pub struct ChannelCloner {
	mux: Arc<Multiplexer<CounterKeyGen, PortSide, Value>>,
	_receiver: MessagePort<Envelope>,
}

impl ChannelCloner {
	/// Opens the channel and starts the receiving port.
	pub fn new(host: &Host) -> std::result::Result<Self, PortError> {
		let MessageChannel { port1, port2 } = host.message_channel::<Envelope>();
		let mux = Arc::new(Multiplexer::new(CounterKeyGen::new(), PortSide(port1)));

		let weak = Arc::downgrade(&mux);
		port2.start(move |(key, value): Envelope| {
			if let Some(mux) = weak.upgrade() {
				mux.deliver(&key, value);
			}
		})?;

		Ok(Self { mux, _receiver: port2 })
	}

	/// Clone requests awaiting their copy.
	pub fn pending(&self) -> usize {
		self.mux.pending()
	}
}

#[async_trait]
impl Cloner for ChannelCloner {
	fn kind(&self) -> StrategyKind {
		StrategyKind::MessageChannel
	}

	async fn clone_async(&self, value: &Value) -> Result<Value> {
		let reply = self.mux.send(value);
		// The host loop may answer before the first poll.
		tokio::task::yield_now().await;
		Ok(reply?.await?)
	}
}

#[cfg(test)]
mod tests {
	use std::pin::pin;

	use dolly_host::Capabilities;
	use dolly_primitives::OpaqueHandle;
	use futures::future::join_all;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::CloneError;

	fn cloner() -> ChannelCloner {
		ChannelCloner::new(&Host::isolated(Capabilities::all())).unwrap()
	}

	#[tokio::test]
	async fn concurrent_clones_each_get_their_own_value() {
		let cloner = cloner();
		let values: Vec<Value> = (0..16).map(|n| Value::object([("n", Value::from(n))])).collect();
		let copies = join_all(values.iter().map(|v| cloner.clone_async(v))).await;

		for (value, copy) in values.iter().zip(copies) {
			assert_eq!(copy.as_ref(), Ok(value));
		}
		assert_eq!(cloner.pending(), 0);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn clone_is_never_ready_on_first_poll() {
		let cloner = cloner();
		for n in 0..32 {
			let value = Value::from(n);
			let mut clone = pin!(cloner.clone_async(&value));
			assert!(futures::poll!(clone.as_mut()).is_pending());
			assert_eq!(clone.await, Ok(Value::from(n)));
		}

		let opaque = Value::from(OpaqueHandle::new("Function"));
		let mut failing = pin!(cloner.clone_async(&opaque));
		assert!(futures::poll!(failing.as_mut()).is_pending());
		assert!(failing.await.is_err());
	}

	#[tokio::test]
	async fn sync_clone_is_unsupported() {
		let err = cloner().clone_sync(&Value::Null).unwrap_err();
		assert_eq!(err, CloneError::Unsupported { strategy: StrategyKind::MessageChannel });
	}

	#[tokio::test]
	async fn uncloneable_value_fails_without_leaking() {
		let cloner = cloner();
		let err = cloner.clone_async(&Value::from(OpaqueHandle::new("Function"))).await.unwrap_err();
		assert!(matches!(err, CloneError::Port(PortError::DataClone(_))));
		assert_eq!(cloner.pending(), 0);
	}
}
