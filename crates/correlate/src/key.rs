//! Correlation key allocation.

use std::collections::hash_map::RandomState;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Allocates correlation keys for one multiplexer.
///
/// Implementations must never return a key that is equal to one still pending.
pub trait KeyGen: Send + 'static {
	/// Key attached to a request and echoed by its reply.
	type Key: Eq + Hash + Clone + Debug + Send + 'static;

	/// Allocates the next key.
	fn next_key(&mut self) -> Self::Key;
}

/// Simple counter-based key generator.
///
/// Sufficient when the channel is exclusively owned, e.g. a dedicated pair of
/// message ports.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterKeyGen(pub u64);

impl CounterKeyGen {
	/// Creates a new counter starting at 0.
	#[must_use]
	pub const fn new() -> Self {
		Self(0)
	}
}

impl KeyGen for CounterKeyGen {
	type Key = u64;

	fn next_key(&mut self) -> u64 {
		let id = self.0;
		self.0 += 1;
		id
	}
}

/// Counter keys rendered under a per-instance prefix: `"<prefix>:<n>"`.
///
/// Required on channels shared with arbitrary other traffic. The prefix comes from
/// a weak time/random seed, so two instances colliding is unlikely but possible.
#[derive(Debug, Clone)]
pub struct PrefixedKeyGen {
	prefix: KeyPrefix,
	counter: CounterKeyGen,
}

impl PrefixedKeyGen {
	/// Creates a generator whose prefix is `namespace` plus a seeded suffix.
	pub fn new(namespace: &str) -> Self {
		Self::with_prefix(format!("{namespace}-{:016x}", weak_seed()))
	}

	/// Creates a generator with a fixed prefix.
	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self {
			prefix: KeyPrefix(Arc::from(prefix.into())),
			counter: CounterKeyGen::new(),
		}
	}

	/// Returns the key shape this generator produces.
	pub fn prefix(&self) -> KeyPrefix {
		self.prefix.clone()
	}
}

impl KeyGen for PrefixedKeyGen {
	type Key = String;

	fn next_key(&mut self) -> String {
		format!("{}:{}", self.prefix.0, self.counter.next_key())
	}
}

/// Cheap handle for recognizing keys minted by one [`PrefixedKeyGen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix(Arc<str>);

impl KeyPrefix {
	/// Prefix text without the `:` separator.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns true if `key` has exactly the shape `"<prefix>:<u64>"`.
	pub fn matches(&self, key: &str) -> bool {
		key.strip_prefix(&*self.0)
			.and_then(|rest| rest.strip_prefix(':'))
			.is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
	}
}

fn weak_seed() -> u64 {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos() as u64);
	let mut hasher = RandomState::new().build_hasher();
	hasher.write_u64(nanos);
	hasher.finish()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counter_is_monotonic_from_zero() {
		let mut keys = CounterKeyGen::new();
		assert_eq!((keys.next_key(), keys.next_key(), keys.next_key()), (0, 1, 2));
	}

	#[test]
	fn prefixed_keys_carry_prefix_and_counter() {
		let mut keys = PrefixedKeyGen::with_prefix("dolly-ab");
		assert_eq!(keys.next_key(), "dolly-ab:0");
		assert_eq!(keys.next_key(), "dolly-ab:1");
	}

	#[test]
	fn prefix_recognizes_only_own_shape() {
		let mut keys = PrefixedKeyGen::new("dolly");
		let prefix = keys.prefix();
		let key = keys.next_key();
		assert!(prefix.matches(&key));
		assert!(!prefix.matches(prefix.as_str()));
		assert!(!prefix.matches(&format!("{}:", prefix.as_str())));
		assert!(!prefix.matches(&format!("{}:12x", prefix.as_str())));
		assert!(!prefix.matches(&format!("{}0:1", prefix.as_str())));
		assert!(!prefix.matches("unrelated:1"));
	}

	#[test]
	fn independent_instances_get_distinct_prefixes() {
		let a = PrefixedKeyGen::new("dolly");
		let b = PrefixedKeyGen::new("dolly");
		assert_ne!(a.prefix(), b.prefix());
	}
}
