//! Installing a custom selection before first use.

use dolly_clone::{CloneConfig, Registry, Selection, StrategyKind, Value};
use dolly_host::{Capabilities, Host};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn installed_selection_backs_the_facade() {
	let host = Host::isolated(Capabilities::STRUCTURED_CLONE | Capabilities::EVENT_BUS);
	let selection = Selection::select(&Registry::native(&host, &CloneConfig::default()));

	let installed = dolly_clone::install(selection).unwrap();
	assert_eq!(installed.async_kind(), Some(StrategyKind::EventBus));
	assert_eq!(installed.warnings().len(), 1);

	assert_eq!(dolly_clone::clone_async(&Value::from("via bus")).await, Ok(Value::from("via bus")));
	assert_eq!(host.event_bus().listener_count(), 1);

	let rejected = dolly_clone::install(Selection::none()).unwrap_err();
	assert!(!rejected.can_clone_sync());
	assert_eq!(dolly_clone::selection().async_kind(), Some(StrategyKind::EventBus));
}
