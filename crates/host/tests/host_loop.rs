//! Facilities created inside one runtime keep working after it shuts down.

use std::sync::mpsc;
use std::time::Duration;

use dolly_host::{Capabilities, Host, MessageChannel, MessageEvent, Value};

fn short_lived_runtime() -> tokio::runtime::Runtime {
	tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

#[test]
fn port_started_in_a_dropped_runtime_still_delivers() {
	let channel = MessageChannel::<Value>::new();
	let (tx, rx) = mpsc::channel();

	let runtime = short_lived_runtime();
	runtime.block_on(async {
		channel
			.port2
			.start(move |value| {
				let _ = tx.send(value);
			})
			.unwrap();
	});
	drop(runtime);

	channel.port1.post(&Value::from("after")).unwrap();
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Value::from("after"));
}

#[test]
fn bus_and_stores_work_without_any_caller_runtime() {
	let host = Host::isolated(Capabilities::all());
	let (tx, rx) = mpsc::channel();
	host.event_bus().subscribe(move |event: &mut MessageEvent| {
		let _ = tx.send(event.decode::<Value>());
	});
	host.event_bus().post(&Value::from(3)).unwrap();
	assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(Value::from(3)));

	let opened = short_lived_runtime().block_on(host.stores().open("loop", 1, |schema| {
		schema.create_store("records");
	}));
	let db = opened.unwrap();
	assert_eq!(db.store_names(), vec!["records".to_owned()]);
}
