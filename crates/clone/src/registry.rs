//! Ranked strategy candidates.
//!
//! A [`Registry`] holds two independent rankings, one per call mode. Each entry
//! pairs a strategy with a capability probe and a constructor; nothing is probed or
//! built until a [`Selection`](crate::Selection) walks the ranking.

use std::fmt;
use std::sync::Arc;

use dolly_host::{Capabilities, Host};

use crate::config::CloneConfig;
use crate::strategy::{BusCloner, ChannelCloner, Cloner, NativeCloner, StoreCloner, StrategyKind};
use crate::Result;

/// Capability probe. Must be cheap and side-effect free.
pub type Probe = Arc<dyn Fn() -> bool + Send + Sync>;

/// Builds a strategy instance once its probe succeeded.
pub type Constructor = Arc<dyn Fn() -> Result<Arc<dyn Cloner>> + Send + Sync>;

/// One registry entry.
#[derive(Clone)]
pub struct StrategyDescriptor {
	kind: StrategyKind,
	probe: Probe,
	construct: Constructor,
	sync_capable: bool,
	warning: Option<&'static str>,
}

impl StrategyDescriptor {
	/// Creates an async-only descriptor without a warning.
	pub fn new<P, C>(kind: StrategyKind, probe: P, construct: C) -> Self
	where
		P: Fn() -> bool + Send + Sync + 'static,
		C: Fn() -> Result<Arc<dyn Cloner>> + Send + Sync + 'static,
	{
		Self {
			kind,
			probe: Arc::new(probe),
			construct: Arc::new(construct),
			sync_capable: false,
			warning: None,
		}
	}

	/// Marks the strategy as able to clone without suspending.
	#[must_use]
	pub fn sync_capable(mut self) -> Self {
		self.sync_capable = true;
		self
	}

	/// Attaches a notice surfaced when the strategy is selected.
	#[must_use]
	pub fn with_warning(mut self, warning: &'static str) -> Self {
		self.warning = Some(warning);
		self
	}

	/// Strategy this entry builds.
	pub fn kind(&self) -> StrategyKind {
		self.kind
	}

	/// Whether the strategy may sit in the synchronous ranking.
	pub fn is_sync_capable(&self) -> bool {
		self.sync_capable
	}

	/// Notice surfaced on selection, if any.
	pub fn warning(&self) -> Option<&'static str> {
		self.warning
	}

	/// Runs the capability probe.
	pub fn probe(&self) -> bool {
		(self.probe)()
	}

	/// Runs the constructor.
	pub fn construct(&self) -> Result<Arc<dyn Cloner>> {
		(self.construct)()
	}
}

impl fmt::Debug for StrategyDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StrategyDescriptor")
			.field("kind", &self.kind)
			.field("sync_capable", &self.sync_capable)
			.field("warning", &self.warning)
			.finish_non_exhaustive()
	}
}

/// Two rankings of candidates, most preferred first.
#[derive(Debug, Clone, Default)]
pub struct Registry {
	sync: Vec<StrategyDescriptor>,
	async_: Vec<StrategyDescriptor>,
}

impl Registry {
	/// Creates an empty registry. Selecting from it yields nothing in either mode.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a candidate to the synchronous ranking.
	///
	/// # Panics
	///
	/// Panics in debug builds if `descriptor` is not sync-capable.
	#[must_use]
	pub fn with_sync(mut self, descriptor: StrategyDescriptor) -> Self {
		debug_assert!(descriptor.sync_capable, "{} is not sync-capable", descriptor.kind);
		self.sync.push(descriptor);
		self
	}

	/// Appends a candidate to the asynchronous ranking.
	#[must_use]
	pub fn with_async(mut self, descriptor: StrategyDescriptor) -> Self {
		self.async_.push(descriptor);
		self
	}

	/// Synchronous ranking, most preferred first.
	pub fn sync_candidates(&self) -> &[StrategyDescriptor] {
		&self.sync
	}

	/// Asynchronous ranking, most preferred first.
	pub fn async_candidates(&self) -> &[StrategyDescriptor] {
		&self.async_
	}

	/// The built-in rankings over `host`.
	///
	/// Synchronous: native. Asynchronous: message-channel, event-bus, object-store.
	/// Each probe checks the host capability and the disabled list in `config`.
	pub fn native(host: &Host, config: &CloneConfig) -> Self {
		let probe = |kind: StrategyKind, capability: Capabilities| {
			let host = host.clone();
			let disabled = config.is_disabled(kind);
			move || !disabled && host.supports(capability)
		};

		let native = {
			let host = host.clone();
			move || -> Result<Arc<dyn Cloner>> { Ok(Arc::new(NativeCloner::new(host.clone())) as Arc<dyn Cloner>) }
		};
		let channel = {
			let host = host.clone();
			move || -> Result<Arc<dyn Cloner>> { Ok(Arc::new(ChannelCloner::new(&host)?) as Arc<dyn Cloner>) }
		};
		let bus = {
			let host = host.clone();
			move || -> Result<Arc<dyn Cloner>> { Ok(Arc::new(BusCloner::new(&host)) as Arc<dyn Cloner>) }
		};
		let store = {
			let host = host.clone();
			let name = config.store_name.clone();
			let version = config.store_version;
			move || -> Result<Arc<dyn Cloner>> { Ok(Arc::new(StoreCloner::new(&host, &name, version)) as Arc<dyn Cloner>) }
		};

		Self::new()
			.with_sync(
				StrategyDescriptor::new(StrategyKind::Native, probe(StrategyKind::Native, Capabilities::STRUCTURED_CLONE), native)
					.sync_capable(),
			)
			.with_async(StrategyDescriptor::new(
				StrategyKind::MessageChannel,
				probe(StrategyKind::MessageChannel, Capabilities::MESSAGE_CHANNEL),
				channel,
			))
			.with_async(
				StrategyDescriptor::new(StrategyKind::EventBus, probe(StrategyKind::EventBus, Capabilities::EVENT_BUS), bus)
					.with_warning(BusCloner::WARNING),
			)
			.with_async(
				StrategyDescriptor::new(StrategyKind::ObjectStore, probe(StrategyKind::ObjectStore, Capabilities::OBJECT_STORE), store)
					.with_warning(StoreCloner::WARNING),
			)
	}
}
