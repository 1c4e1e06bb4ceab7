//! Strategy selection and the process-wide instance behind the facade.
//!
//! Each call mode walks its own ranking once, independently of the other: the first
//! candidate whose probe succeeds is constructed and kept for the rest of the
//! selection's life. Later candidates are neither probed nor built.

use std::sync::{Arc, OnceLock};

use dolly_host::Host;
use dolly_primitives::Value;

use crate::config::CloneConfig;
use crate::registry::{Registry, StrategyDescriptor};
use crate::strategy::{Cloner, FailedCloner, StrategyKind};
use crate::{CloneError, Result};

#[derive(Clone)]
struct Selected {
	kind: StrategyKind,
	warning: Option<&'static str>,
	cloner: Arc<dyn Cloner>,
}

/// The chosen strategy per call mode.
#[derive(Clone)]
pub struct Selection {
	sync: Option<Selected>,
	async_: Option<Selected>,
}

impl Selection {
	/// Probes `registry` and constructs the winner of each ranking.
	///
	/// A winner whose constructor fails stays selected and reports the construction
	/// error from every call.
	pub fn select(registry: &Registry) -> Self {
		Self {
			sync: pick("sync", registry.sync_candidates()),
			async_: pick("async", registry.async_candidates()),
		}
	}

	/// A selection with nothing chosen; every clone fails with
	/// [`CloneError::Unavailable`].
	pub fn none() -> Self {
		Self { sync: None, async_: None }
	}

	/// Clones with the synchronous strategy.
	pub fn clone_sync(&self, value: &Value) -> Result<Value> {
		match &self.sync {
			Some(selected) => selected.cloner.clone_sync(value),
			None => Err(CloneError::Unavailable),
		}
	}

	/// Clones with the asynchronous strategy.
	///
	/// Without one, falls back to the synchronous strategy after yielding, so the
	/// result is still never ready on the first poll.
	pub async fn clone_async(&self, value: &Value) -> Result<Value> {
		match &self.async_ {
			Some(selected) => selected.cloner.clone_async(value).await,
			None => {
				tokio::task::yield_now().await;
				self.clone_sync(value)
			}
		}
	}

	/// Returns true if a synchronous strategy was selected.
	pub fn can_clone_sync(&self) -> bool {
		self.sync.is_some()
	}

	/// Returns true if an asynchronous strategy was selected. The synchronous
	/// fallback of [`clone_async`](Self::clone_async) does not count.
	pub fn can_clone_async(&self) -> bool {
		self.async_.is_some()
	}

	/// Kind of the synchronous strategy.
	pub fn sync_kind(&self) -> Option<StrategyKind> {
		self.sync.as_ref().map(|s| s.kind)
	}

	/// Kind of the asynchronous strategy, not counting the synchronous fallback.
	pub fn async_kind(&self) -> Option<StrategyKind> {
		self.async_.as_ref().map(|s| s.kind)
	}

	/// Notices attached to the selected strategies.
	pub fn warnings(&self) -> Vec<(StrategyKind, &'static str)> {
		[&self.sync, &self.async_]
			.into_iter()
			.flatten()
			.filter_map(|s| s.warning.map(|w| (s.kind, w)))
			.collect()
	}
}

impl std::fmt::Debug for Selection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Selection")
			.field("sync", &self.sync_kind())
			.field("async", &self.async_kind())
			.finish()
	}
}

fn pick(mode: &'static str, candidates: &[StrategyDescriptor]) -> Option<Selected> {
	let Some(descriptor) = candidates.iter().find(|d| {
		let viable = d.probe();
		if !viable {
			tracing::debug!(mode, strategy = %d.kind(), "clone.select.skip");
		}
		viable
	}) else {
		tracing::debug!(mode, "clone.select.none");
		return None;
	};

	let kind = descriptor.kind();
	let cloner = descriptor
		.construct()
		.unwrap_or_else(|error| Arc::new(FailedCloner { kind, error }) as Arc<dyn Cloner>);
	tracing::debug!(mode, strategy = %kind, "clone.select");
	if let Some(warning) = descriptor.warning() {
		tracing::warn!(mode, strategy = %kind, warning, "clone.strategy.warning");
	}

	Some(Selected {
		kind,
		warning: descriptor.warning(),
		cloner,
	})
}

static SELECTION: OnceLock<Selection> = OnceLock::new();

/// The process-wide selection, made on first use from [`Host::detect`] and
/// [`CloneConfig::from_env_lossy`].
///
/// Invalid configuration entries are reported and skipped; the valid rest still
/// applies. Use [`install`] with [`CloneConfig::from_env`] for strict loading.
pub fn selection() -> &'static Selection {
	SELECTION.get_or_init(|| {
		let (config, errors) = CloneConfig::from_env_lossy();
		for error in &errors {
			tracing::warn!(%error, "clone.config.invalid");
		}
		Selection::select(&Registry::native(&Host::detect(), &config))
	})
}

/// Installs `selection` as the process-wide one.
///
/// Fails, handing `selection` back, if one was already made or installed.
pub fn install(selection: Selection) -> std::result::Result<&'static Selection, Selection> {
	SELECTION.set(selection)?;
	Ok(self::selection())
}
