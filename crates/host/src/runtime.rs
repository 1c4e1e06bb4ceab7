//! The host event loop.

use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

/// Returns the host loop handle, creating the loop on first use.
///
/// Deliveries never run on the caller's runtime: a strategy selected inside one
/// runtime must keep working after that runtime shuts down.
pub fn handle() -> tokio::runtime::Handle {
	static HOST_LOOP: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = HOST_LOOP.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("dolly-host-loop")
			.build()
			.expect("failed to build dolly host event loop")
	});
	runtime.handle().clone()
}

/// Spawns a delivery task on the host loop.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!("host.spawn");
	handle().spawn(fut)
}
