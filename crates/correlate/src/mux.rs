//! Pending-request table and reply futures.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{Disconnected, KeyGen};

/// Sending half of a correlated channel.
///
/// `transmit` must put `(key, request)` on the wire so that the reply eventually
/// observed by the delivery side carries the same key.
pub trait Outgoing<K, Req>: Send + Sync {
	/// Synchronous transmission failure, e.g. an unserializable request.
	type Error;

	/// Transmits one keyed request.
	fn transmit(&self, key: &K, request: Req) -> Result<(), Self::Error>;
}

/// Outcome of handing one inbound message to [`Multiplexer::deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
	/// The key matched a pending request, which is now completed.
	Claimed,
	/// No pending request had this key; the message was dropped.
	Ignored,
}

/// Pairs outgoing requests with replies arriving in any order.
///
/// The table is mutated only by [`send`](Self::send) (insert) and
/// [`deliver`](Self::deliver) (remove). Its size always equals the number of
/// requests sent but not yet answered.
pub struct Multiplexer<G: KeyGen, O, Resp> {
	keys: Mutex<G>,
	pending: Mutex<HashMap<G::Key, oneshot::Sender<Resp>>>,
	outgoing: O,
}

impl<G, O, Resp> Multiplexer<G, O, Resp>
where
	G: KeyGen,
	Resp: Send + 'static,
{
	/// Creates a multiplexer with an empty pending table.
	pub fn new(keys: G, outgoing: O) -> Self {
		Self {
			keys: Mutex::new(keys),
			pending: Mutex::new(HashMap::new()),
			outgoing,
		}
	}

	/// Registers a fresh key, transmits the request under it, and returns the
	/// future of its reply.
	///
	/// The entry is inserted before transmission, so a reply racing ahead of this
	/// call's return still finds it. On transmission failure the entry is removed
	/// again and the error returned.
	pub fn send<Req>(&self, request: Req) -> Result<Reply<Resp>, O::Error>
	where
		O: Outgoing<G::Key, Req>,
	{
		let key = self.keys.lock().next_key();
		let (tx, rx) = oneshot::channel();
		let previous = self.pending.lock().insert(key.clone(), tx);
		debug_assert!(previous.is_none(), "correlation key {key:?} reused while pending");

		if let Err(err) = self.outgoing.transmit(&key, request) {
			self.pending.lock().remove(&key);
			return Err(err);
		}
		tracing::trace!(key = ?key, pending = self.pending(), "correlate.send");
		Ok(Reply { rx })
	}

	/// Routes one inbound reply to its waiter.
	///
	/// Unknown keys are ignored: on shared channels they belong to unrelated traffic,
	/// and a second reply for an already completed key is never delivered twice.
	pub fn deliver<Q>(&self, key: &Q, response: Resp) -> Delivery
	where
		G::Key: Borrow<Q>,
		Q: Hash + Eq + std::fmt::Debug + ?Sized,
	{
		let Some(tx) = self.pending.lock().remove(key) else {
			tracing::trace!(key = ?key, "correlate.deliver.ignored");
			return Delivery::Ignored;
		};
		// A dropped reply future still consumes its entry.
		let _ = tx.send(response);
		Delivery::Claimed
	}

	/// Number of requests awaiting a reply.
	pub fn pending(&self) -> usize {
		self.pending.lock().len()
	}

	/// Returns the sending half.
	pub fn outgoing(&self) -> &O {
		&self.outgoing
	}
}

impl<G: KeyGen, O, Resp> std::fmt::Debug for Multiplexer<G, O, Resp> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Multiplexer").field("pending", &self.pending.lock().len()).finish_non_exhaustive()
	}
}

/// Future resolving to the reply correlated with one request.
///
/// Never times out. Dropping it does not cancel the request; the entry stays in
/// the table until its reply arrives.
#[derive(Debug)]
#[must_use = "a reply does nothing unless awaited"]
pub struct Reply<V> {
	rx: oneshot::Receiver<V>,
}

impl<V> Future for Reply<V> {
	type Output = Result<V, Disconnected>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.get_mut().rx).poll(cx).map_err(|_| Disconnected)
	}
}
