//! Host platform facilities consumed by the clone strategies.
//!
//! Each facility moves a [`Value`] across some boundary and reconstructs it on the
//! other side by structured serialization:
//! * [`codec`]: the synchronous structured clone primitive itself
//! * [`MessageChannel`]: a private pair of entangled ports
//! * [`EventBus`]: a process-wide broadcast of message events
//! * [`StoreFactory`]: named transactional object stores
//!
//! Asynchronous deliveries run on a dedicated host event loop ([`runtime`]) so that
//! ports and listeners outlive whichever runtime created them. [`Host`] bundles the
//! facilities with the [`Capabilities`] a probe is allowed to see.

#![warn(missing_docs)]

pub mod bus;
pub mod channel;
pub mod codec;
pub mod error;
pub mod runtime;
pub mod store;

use bitflags::bitflags;
pub use bus::{EventBus, ListenerId, MessageEvent};
pub use channel::{MessageChannel, MessagePort};
pub use dolly_primitives::Value;
pub use error::{DataCloneError, PortError, StoreError};
pub use store::{Database, Schema, StoreFactory, Transaction};

bitflags! {
	/// Facilities a host exposes to capability probes.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Capabilities: u8 {
		/// Synchronous in-process structured clone.
		const STRUCTURED_CLONE = 1 << 0;
		/// Private entangled message ports.
		const MESSAGE_CHANNEL = 1 << 1;
		/// Process-wide message event bus.
		const EVENT_BUS = 1 << 2;
		/// Named transactional object stores.
		const OBJECT_STORE = 1 << 3;
	}
}

/// Handle to the host environment.
#[derive(Debug, Clone)]
pub struct Host {
	capabilities: Capabilities,
	bus: EventBus,
	stores: StoreFactory,
}

impl Host {
	/// Detects the running host: every facility, with the process-wide bus and
	/// store factory.
	pub fn detect() -> Self {
		Self {
			capabilities: Capabilities::all(),
			bus: EventBus::global().clone(),
			stores: StoreFactory::global().clone(),
		}
	}

	/// Creates a host with its own private bus and store factory.
	pub fn isolated(capabilities: Capabilities) -> Self {
		Self {
			capabilities,
			bus: EventBus::new(),
			stores: StoreFactory::new(),
		}
	}

	/// Restricts the capabilities reported to probes.
	#[must_use]
	pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
		self.capabilities = capabilities;
		self
	}

	/// Reported capability set.
	pub const fn capabilities(&self) -> Capabilities {
		self.capabilities
	}

	/// Returns true if every facility in `capabilities` is reported.
	pub fn supports(&self, capabilities: Capabilities) -> bool {
		self.capabilities.contains(capabilities)
	}

	/// Synchronous structured clone.
	pub fn structured_clone(&self, value: &Value) -> Result<Value, DataCloneError> {
		codec::structured_clone(value)
	}

	/// Creates a fresh private channel.
	pub fn message_channel<T>(&self) -> MessageChannel<T> {
		MessageChannel::new()
	}

	/// The host's event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.bus
	}

	/// The host's store factory.
	pub fn stores(&self) -> &StoreFactory {
		&self.stores
	}
}
