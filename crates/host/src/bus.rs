//! Process-wide message event bus.
//!
//! Every posted message is serialized at once and dispatched later, on the host
//! loop, to each listener in registration order. A listener may call
//! [`MessageEvent::stop_immediate_propagation`] to hide the event from every
//! listener after it. The bus is shared with arbitrary unrelated traffic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{DataCloneError, codec, runtime};

/// Callback invoked for every dispatched event.
pub type Listener = Arc<dyn Fn(&mut MessageEvent) + Send + Sync>;

/// Registration handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// One dispatched message.
///
/// The payload stays encoded; every listener decoding it gets its own copy, and a
/// listener decoding it as a type it does not have simply gets an error.
#[derive(Debug)]
pub struct MessageEvent {
	data: Vec<u8>,
	stopped: bool,
}

impl MessageEvent {
	/// Decodes the payload.
	pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DataCloneError> {
		codec::deserialize(&self.data)
	}

	/// Prevents every remaining listener from seeing this event.
	pub fn stop_immediate_propagation(&mut self) {
		self.stopped = true;
	}

	/// Returns true once propagation was stopped.
	pub const fn is_propagation_stopped(&self) -> bool {
		self.stopped
	}
}

#[derive(Default)]
struct BusInner {
	listeners: RwLock<Vec<(ListenerId, Listener)>>,
	next_id: AtomicU64,
}

/// Broadcast bus of [`MessageEvent`]s.
#[derive(Clone, Default)]
pub struct EventBus {
	inner: Arc<BusInner>,
}

impl EventBus {
	/// Creates a standalone bus.
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide bus.
	pub fn global() -> &'static EventBus {
		static GLOBAL: OnceLock<EventBus> = OnceLock::new();
		GLOBAL.get_or_init(EventBus::new)
	}

	/// Appends a listener.
	pub fn subscribe<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&mut MessageEvent) + Send + Sync + 'static,
	{
		let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
		self.inner.listeners.write().push((id, Arc::new(listener)));
		id
	}

	/// Removes a listener. Returns false if it was not registered.
	pub fn unsubscribe(&self, id: ListenerId) -> bool {
		let mut listeners = self.inner.listeners.write();
		let before = listeners.len();
		listeners.retain(|(lid, _)| *lid != id);
		listeners.len() != before
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.read().len()
	}

	/// Serializes `message` and schedules its dispatch.
	pub fn post<M: Serialize + ?Sized>(&self, message: &M) -> Result<(), DataCloneError> {
		let data = codec::serialize(message)?;
		let inner = Arc::clone(&self.inner);
		runtime::spawn(async move { inner.dispatch(data) });
		Ok(())
	}
}

impl BusInner {
	fn dispatch(&self, data: Vec<u8>) {
		// Listeners added during dispatch do not see this event.
		let listeners: Vec<Listener> = self.listeners.read().iter().map(|(_, l)| Arc::clone(l)).collect();
		tracing::trace!(listeners = listeners.len(), bytes = data.len(), "host.bus.dispatch");

		let mut event = MessageEvent { data, stopped: false };
		for listener in listeners {
			listener(&mut event);
			if event.stopped {
				break;
			}
		}
	}
}

impl std::fmt::Debug for EventBus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventBus").field("listeners", &self.listener_count()).finish()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tokio::sync::mpsc;

	use super::*;
	use crate::Value;

	async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Option<T> {
		tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.ok().flatten()
	}

	#[tokio::test]
	async fn every_listener_sees_unclaimed_events() {
		let bus = EventBus::new();
		let (tx, mut rx) = mpsc::unbounded_channel();
		for name in ["first", "second"] {
			let tx = tx.clone();
			bus.subscribe(move |event| {
				let _ = tx.send((name, event.decode::<Value>().ok()));
			});
		}

		bus.post(&Value::from("hello")).unwrap();
		assert_eq!(recv(&mut rx).await, Some(("first", Some(Value::from("hello")))));
		assert_eq!(recv(&mut rx).await, Some(("second", Some(Value::from("hello")))));
	}

	#[tokio::test]
	async fn stopping_propagation_hides_event_from_later_listeners() {
		let bus = EventBus::new();
		let (tx, mut rx) = mpsc::unbounded_channel();
		let claim_tx = tx.clone();
		bus.subscribe(move |event| {
			let data = event.decode::<Value>().unwrap_or_default();
			if data.as_str() == Some("mine") {
				event.stop_immediate_propagation();
				let _ = claim_tx.send(("claimer", data));
			}
		});
		bus.subscribe(move |event| {
			let _ = tx.send(("bystander", event.decode::<Value>().unwrap_or_default()));
		});

		bus.post(&Value::from("mine")).unwrap();
		bus.post(&Value::from("theirs")).unwrap();

		let mut seen = vec![recv(&mut rx).await, recv(&mut rx).await];
		seen.sort_by_key(|entry| entry.as_ref().map(|(who, _)| *who));
		assert_eq!(
			seen,
			vec![Some(("bystander", Value::from("theirs"))), Some(("claimer", Value::from("mine")))]
		);
	}

	#[test]
	fn unsubscribe_removes_only_that_listener() {
		let bus = EventBus::new();
		let a = bus.subscribe(|_| {});
		let _b = bus.subscribe(|_| {});
		assert!(bus.unsubscribe(a));
		assert!(!bus.unsubscribe(a));
		assert_eq!(bus.listener_count(), 1);
	}

	#[tokio::test]
	async fn listeners_decode_their_own_shapes() {
		#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
		struct Ping {
			seq: u64,
		}

		let bus = EventBus::new();
		let (tx, mut rx) = mpsc::unbounded_channel();
		bus.subscribe(move |event| {
			let _ = tx.send(event.decode::<Ping>().ok());
		});
		bus.post(&Value::from("not a ping")).unwrap();
		bus.post(&Ping { seq: 4 }).unwrap();

		let mut seen = vec![recv(&mut rx).await.flatten(), recv(&mut rx).await.flatten()];
		seen.sort_by_key(Option::is_some);
		assert_eq!(seen, vec![None, Some(Ping { seq: 4 })]);
	}

	#[test]
	fn uncloneable_data_is_rejected_before_dispatch() {
		let bus = EventBus::new();
		let opaque = Value::from(dolly_primitives::OpaqueHandle::new("Window"));
		assert!(bus.post(&opaque).is_err());
	}
}
