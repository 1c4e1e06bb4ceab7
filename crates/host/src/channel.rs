//! Private two-port message channels.

use std::marker::PhantomData;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::{PortError, codec, runtime};

/// A pair of entangled ports: whatever one posts, the other receives.
pub struct MessageChannel<T> {
	/// First port.
	pub port1: MessagePort<T>,
	/// Second port.
	pub port2: MessagePort<T>,
}

impl<T> MessageChannel<T> {
	/// Creates a new entangled pair.
	pub fn new() -> Self {
		let (to_port1, inbox1) = mpsc::unbounded_channel();
		let (to_port2, inbox2) = mpsc::unbounded_channel();
		Self {
			port1: MessagePort::new(to_port2, inbox1),
			port2: MessagePort::new(to_port1, inbox2),
		}
	}
}

impl<T> Default for MessageChannel<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// One end of a [`MessageChannel`], receiving messages decoded as `T`.
///
/// Posting serializes immediately, so an uncloneable message fails in the call.
/// Delivery to the other port happens later on the host loop, once that port has
/// been [started](Self::start).
pub struct MessagePort<T> {
	remote: mpsc::UnboundedSender<Vec<u8>>,
	inbox: Mutex<Option<mpsc::UnboundedReceiver<Vec<u8>>>>,
	_message: PhantomData<fn(T) -> T>,
}

impl<T> MessagePort<T> {
	fn new(remote: mpsc::UnboundedSender<Vec<u8>>, inbox: mpsc::UnboundedReceiver<Vec<u8>>) -> Self {
		Self {
			remote,
			inbox: Mutex::new(Some(inbox)),
			_message: PhantomData,
		}
	}

	/// Returns true once [`start`](Self::start) has been called.
	pub fn is_started(&self) -> bool {
		self.inbox.lock().is_none()
	}
}

impl<T> MessagePort<T>
where
	T: DeserializeOwned + Send + 'static,
{
	/// Serializes `message` and queues it for the entangled port.
	///
	/// Any message whose encoding decodes as `T` may be posted, which lets senders
	/// post borrowed views of owned messages.
	pub fn post<M: Serialize + ?Sized>(&self, message: &M) -> Result<(), PortError> {
		let bytes = codec::serialize(message)?;
		self.remote.send(bytes).map_err(|_| PortError::Closed)
	}

	/// Starts delivering inbound messages to `handler` on the host loop.
	///
	/// Messages are delivered in the order they were posted. Delivery stops when
	/// the entangled port is dropped.
	pub fn start<F>(&self, handler: F) -> Result<(), PortError>
	where
		F: Fn(T) + Send + 'static,
	{
		let mut inbox = self.inbox.lock().take().ok_or(PortError::AlreadyStarted)?;
		runtime::spawn(async move {
			while let Some(bytes) = inbox.recv().await {
				match codec::deserialize::<T>(&bytes) {
					Ok(message) => handler(message),
					Err(err) => tracing::warn!(error = %err, "host.port.decode_failed"),
				}
			}
			tracing::trace!("host.port.closed");
		});
		Ok(())
	}
}

impl<T> std::fmt::Debug for MessagePort<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MessagePort").field("started", &self.is_started()).finish()
	}
}
