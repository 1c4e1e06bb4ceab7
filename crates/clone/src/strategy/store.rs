use async_trait::async_trait;
use dolly_host::{Database, Host, StoreError};
use dolly_primitives::Value;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use super::{Cloner, StrategyKind};
use crate::Result;

type Ready = Shared<BoxFuture<'static, std::result::Result<Database, StoreError>>>;

/// Clones by writing the value into an object store and reading it back inside a
/// transaction that is then aborted, so nothing is ever persisted.
///
/// Opening the database starts at construction and completes on the host loop;
/// every clone awaits it first.
pub struct StoreCloner {
	ready: Ready,
}

impl StoreCloner {
	/// The single object store kept in the database.
	pub const OBJECT_STORE: &'static str = "clones";

	/// Shown once when this strategy is selected.
	pub const WARNING: &'static str = "the object-store clone strategy creates a named database on the host";

	/// Starts opening database `name` at `version`.
	///
	/// Upgrading from an older version deletes every existing store and recreates
	/// [`Self::OBJECT_STORE`].
	pub fn new(host: &Host, name: &str, version: u32) -> Self {
		let ready = host
			.stores()
			.open(name, version, |schema| {
				for store in schema.store_names() {
					schema.delete_store(&store);
				}
				schema.create_store(Self::OBJECT_STORE);
			})
			.boxed()
			.shared();
		Self { ready }
	}
}

#[async_trait]
impl Cloner for StoreCloner {
	fn kind(&self) -> StrategyKind {
		StrategyKind::ObjectStore
	}

	async fn clone_async(&self, value: &Value) -> Result<Value> {
		// Once the database is open nothing below suspends.
		tokio::task::yield_now().await;
		let db = self.ready.clone().await?;
		let mut tx = db.transaction(Self::OBJECT_STORE)?;
		let key = tx.put(value)?;
		let copy = tx.get(key)?;
		tx.abort();
		copy.ok_or_else(|| {
			StoreError::NotFound {
				store: Self::OBJECT_STORE.to_owned(),
			}
			.into()
		})
	}
}
