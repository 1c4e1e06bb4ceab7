use std::sync::Arc;

use async_trait::async_trait;
use dolly_correlate::{KeyPrefix, Multiplexer, Outgoing, PrefixedKeyGen};
use dolly_host::{DataCloneError, EventBus, Host, ListenerId, MessageEvent};
use dolly_primitives::Value;
use serde::{Deserialize, Serialize};

use super::{Cloner, StrategyKind};
use crate::Result;

const KEY_NAMESPACE: &str = "dolly";

#[derive(Serialize)]
struct Request<'a> {
	#[serde(rename = "dollyKey")]
	key: &'a str,
	value: &'a Value,
}

/// Only the key, so foreign traffic is rejected without decoding its payload.
#[derive(Deserialize)]
struct KeyOnly {
	#[serde(rename = "dollyKey")]
	key: String,
}

#[derive(Deserialize)]
struct Response {
	value: Value,
}

struct BusSide(EventBus);

impl<'a> Outgoing<String, &'a Value> for BusSide {
	type Error = DataCloneError;

	fn transmit(&self, key: &String, value: &'a Value) -> std::result::Result<(), DataCloneError> {
		self.0.post(&Request { key: key.as_str(), value })
	}
}

/// Clones by broadcasting a keyed message on the host's event bus and claiming the
/// copy when it is dispatched back.
///
/// The bus carries unrelated traffic, so keys carry a per-instance prefix and only
/// messages with exactly that shape are claimed. A claimed message stops
/// propagating; anything else passes through untouched.
pub struct BusCloner {
	mux: Arc<Multiplexer<PrefixedKeyGen, BusSide, Value>>,
	prefix: KeyPrefix,
	bus: EventBus,
	listener: ListenerId,
}

impl BusCloner {
	/// Shown once when this strategy is selected.
	pub const WARNING: &'static str =
		"the event-bus clone strategy dispatches every cloned value as a message event that other bus listeners may observe";

	/// Subscribes to the host's bus.
	pub fn new(host: &Host) -> Self {
		let keys = PrefixedKeyGen::new(KEY_NAMESPACE);
		let prefix = keys.prefix();
		let bus = host.event_bus().clone();
		let mux = Arc::new(Multiplexer::new(keys, BusSide(bus.clone())));

		let weak = Arc::downgrade(&mux);
		let claim = prefix.clone();
		let listener = bus.subscribe(move |event: &mut MessageEvent| {
			let Ok(KeyOnly { key }) = event.decode::<KeyOnly>() else {
				return;
			};
			if !claim.matches(&key) {
				return;
			}
			// A malformed message with our key shape is left for other listeners.
			let Ok(Response { value }) = event.decode::<Response>() else {
				return;
			};
			event.stop_immediate_propagation();
			if let Some(mux) = weak.upgrade() {
				mux.deliver(key.as_str(), value);
			}
		});

		Self {
			mux,
			prefix,
			bus,
			listener,
		}
	}

	/// Clone requests awaiting their copy.
	pub fn pending(&self) -> usize {
		self.mux.pending()
	}

	/// Shape of the keys this instance claims.
	pub fn prefix(&self) -> &KeyPrefix {
		&self.prefix
	}
}

impl Drop for BusCloner {
	fn drop(&mut self) {
		self.bus.unsubscribe(self.listener);
	}
}

#[async_trait]
impl Cloner for BusCloner {
	fn kind(&self) -> StrategyKind {
		StrategyKind::EventBus
	}

	async fn clone_async(&self, value: &Value) -> Result<Value> {
		let reply = self.mux.send(value);
		// The host loop may answer before the first poll.
		tokio::task::yield_now().await;
		Ok(reply?.await?)
	}
}
