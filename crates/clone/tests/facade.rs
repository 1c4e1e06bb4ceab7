//! The process-wide facade over the detected host.

use std::pin::pin;

use dolly_clone::{CloneError, OpaqueHandle, StrategyKind, Value};
use futures::future::join_all;
use pretty_assertions::assert_eq;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sample() -> Value {
	Value::object([
		("a", Value::from(vec![Value::from(1), Value::from(2), Value::Null])),
		("name", Value::from("dolly")),
		("ratio", Value::from(0.5)),
	])
}

#[test]
fn capability_queries_are_stable() {
	init_tracing();
	let first = (dolly_clone::can_clone_sync(), dolly_clone::can_clone_async());
	for _ in 0..3 {
		assert_eq!((dolly_clone::can_clone_sync(), dolly_clone::can_clone_async()), first);
	}
	assert_eq!(first, (true, true));
	assert_eq!(dolly_clone::selection().sync_kind(), Some(StrategyKind::Native));
}

#[test]
fn sync_clone_is_deep() {
	init_tracing();
	let original = sample();
	let copy = dolly_clone::clone_sync(&original).unwrap();
	assert_eq!(copy, original);

	let (Some(a), Some(b)) = (original.get("a").and_then(Value::as_array), copy.get("a").and_then(Value::as_array)) else {
		panic!("expected arrays");
	};
	assert!(!std::ptr::eq(a.as_ptr(), b.as_ptr()));
}

#[tokio::test]
async fn async_clone_is_deferred_and_deep() {
	init_tracing();
	let original = sample();
	let mut copy = pin!(dolly_clone::clone_async(&original));
	assert!(futures::poll!(copy.as_mut()).is_pending());
	assert_eq!(copy.await, Ok(original.clone()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_async_clones_are_not_mixed_up() {
	init_tracing();
	let values: Vec<Value> = (0..64).map(|n| Value::object([("n", Value::from(n))])).collect();
	let copies = join_all(values.iter().map(|v| dolly_clone::clone_async(v))).await;
	for (value, copy) in values.iter().zip(copies) {
		assert_eq!(copy.as_ref(), Ok(value));
	}
}

#[tokio::test]
async fn uncloneable_values_fail_in_both_modes() {
	init_tracing();
	let value = Value::from(vec![Value::from(OpaqueHandle::new("Function"))]);

	let err = dolly_clone::clone_sync(&value).unwrap_err();
	assert!(matches!(err, CloneError::DataClone(_)));
	assert!(err.to_string().contains("Function object could not be cloned"));

	assert!(dolly_clone::clone_async(&value).await.is_err());
}
