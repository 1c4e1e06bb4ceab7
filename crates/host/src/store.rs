//! Named transactional object stores.
//!
//! A [`StoreFactory`] holds versioned databases by name. Opening is asynchronous and
//! runs on the host loop; when the requested version is newer than the stored one,
//! the caller's upgrade closure reshapes the [`Schema`] first. Records are stored
//! serialized, so every read produces a fresh value graph.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::{StoreError, Value, codec, runtime};

#[derive(Debug, Default)]
struct StoreData {
	records: BTreeMap<u64, Vec<u8>>,
	next_key: u64,
}

/// Object stores of one database, as seen by an upgrade closure.
#[derive(Debug, Default)]
pub struct Schema {
	stores: BTreeMap<String, StoreData>,
}

impl Schema {
	/// Names of all object stores.
	pub fn store_names(&self) -> Vec<String> {
		self.stores.keys().cloned().collect()
	}

	/// Returns true if the store exists.
	pub fn contains(&self, store: &str) -> bool {
		self.stores.contains_key(store)
	}

	/// Creates an empty store. Returns false if it already existed.
	pub fn create_store(&mut self, store: &str) -> bool {
		if self.stores.contains_key(store) {
			return false;
		}
		self.stores.insert(store.to_owned(), StoreData::default());
		true
	}

	/// Deletes a store and all of its records. Returns false if it did not exist.
	pub fn delete_store(&mut self, store: &str) -> bool {
		self.stores.remove(store).is_some()
	}
}

#[derive(Debug)]
struct DatabaseState {
	version: u32,
	schema: Schema,
}

#[derive(Debug)]
struct DatabaseInner {
	name: String,
	state: Mutex<DatabaseState>,
}

/// An open database handle.
#[derive(Debug, Clone)]
pub struct Database {
	inner: Arc<DatabaseInner>,
}

impl Database {
	fn create(name: &str) -> Self {
		Self {
			inner: Arc::new(DatabaseInner {
				name: name.to_owned(),
				state: Mutex::new(DatabaseState {
					version: 0,
					schema: Schema::default(),
				}),
			}),
		}
	}

	/// Database name.
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Current schema version.
	pub fn version(&self) -> u32 {
		self.inner.state.lock().version
	}

	/// Names of all object stores.
	pub fn store_names(&self) -> Vec<String> {
		self.inner.state.lock().schema.store_names()
	}

	/// Number of committed records in `store`.
	pub fn count(&self, store: &str) -> Result<usize, StoreError> {
		let state = self.inner.state.lock();
		let data = state.schema.stores.get(store).ok_or_else(|| not_found(store))?;
		Ok(data.records.len())
	}

	/// Begins a read-write transaction scoped to `store`.
	pub fn transaction(&self, store: &str) -> Result<Transaction, StoreError> {
		let next_key = {
			let state = self.inner.state.lock();
			state.schema.stores.get(store).ok_or_else(|| not_found(store))?.next_key
		};
		Ok(Transaction {
			db: self.clone(),
			store: store.to_owned(),
			writes: BTreeMap::new(),
			next_key,
		})
	}
}

/// Read-write transaction over one object store.
///
/// Writes are buffered and visible to reads in the same transaction. They reach
/// the store only on [`commit`](Self::commit); [`abort`](Self::abort) or dropping
/// the transaction discards them.
#[derive(Debug)]
pub struct Transaction {
	db: Database,
	store: String,
	writes: BTreeMap<u64, Vec<u8>>,
	next_key: u64,
}

impl Transaction {
	/// Serializes `value` under a fresh auto-incremented key.
	pub fn put(&mut self, value: &Value) -> Result<u64, StoreError> {
		let bytes = codec::serialize(value)?;
		let key = self.next_key;
		self.next_key += 1;
		self.writes.insert(key, bytes);
		Ok(key)
	}

	/// Reads back the record stored under `key`.
	pub fn get(&self, key: u64) -> Result<Option<Value>, StoreError> {
		if let Some(bytes) = self.writes.get(&key) {
			return Ok(Some(codec::deserialize(bytes)?));
		}
		let state = self.db.inner.state.lock();
		let data = state.schema.stores.get(&self.store).ok_or_else(|| not_found(&self.store))?;
		match data.records.get(&key) {
			Some(bytes) => Ok(Some(codec::deserialize(bytes)?)),
			None => Ok(None),
		}
	}

	/// Applies buffered writes.
	pub fn commit(self) -> Result<(), StoreError> {
		let mut state = self.db.inner.state.lock();
		let data = state.schema.stores.get_mut(&self.store).ok_or_else(|| not_found(&self.store))?;
		data.next_key = data.next_key.max(self.next_key);
		data.records.extend(self.writes);
		Ok(())
	}

	/// Discards buffered writes.
	pub fn abort(self) {
		tracing::trace!(store = %self.store, discarded = self.writes.len(), "host.store.abort");
	}
}

/// Registry of named databases.
#[derive(Debug, Clone, Default)]
pub struct StoreFactory {
	databases: Arc<Mutex<HashMap<String, Database>>>,
}

impl StoreFactory {
	/// Creates a standalone factory.
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide factory.
	pub fn global() -> &'static StoreFactory {
		static GLOBAL: OnceLock<StoreFactory> = OnceLock::new();
		GLOBAL.get_or_init(StoreFactory::new)
	}

	/// Opens `name` at `version`, creating it if absent.
	///
	/// `upgrade` runs on the host loop when the database is new or older than
	/// `version`; it is dropped unused otherwise.
	pub fn open<F>(&self, name: &str, version: u32, upgrade: F) -> impl Future<Output = Result<Database, StoreError>> + Send + 'static
	where
		F: FnOnce(&mut Schema) + Send + 'static,
	{
		let databases = Arc::clone(&self.databases);
		let name = name.to_owned();
		let task_name = name.clone();
		let task = runtime::spawn(async move { open_now(&databases, &task_name, version, upgrade) });
		async move {
			task.await.map_err(|err| StoreError::Open {
				name,
				reason: err.to_string(),
			})?
		}
	}

	/// Names of all databases ever opened.
	pub fn database_names(&self) -> Vec<String> {
		let mut names: Vec<_> = self.databases.lock().keys().cloned().collect();
		names.sort();
		names
	}

	/// Deletes a database. Returns false if it did not exist.
	pub fn delete(&self, name: &str) -> bool {
		self.databases.lock().remove(name).is_some()
	}
}

fn open_now<F>(databases: &Mutex<HashMap<String, Database>>, name: &str, version: u32, upgrade: F) -> Result<Database, StoreError>
where
	F: FnOnce(&mut Schema),
{
	let db = databases.lock().entry(name.to_owned()).or_insert_with(|| Database::create(name)).clone();

	let mut state = db.inner.state.lock();
	if state.version > version {
		return Err(StoreError::Version {
			name: name.to_owned(),
			requested: version,
			current: state.version,
		});
	}
	if state.version < version {
		tracing::debug!(database = name, from = state.version, to = version, "host.store.upgrade");
		upgrade(&mut state.schema);
		state.version = version;
	}
	drop(state);
	Ok(db)
}

fn not_found(store: &str) -> StoreError {
	StoreError::NotFound { store: store.to_owned() }
}
