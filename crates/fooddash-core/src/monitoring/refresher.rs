//! Polling refresher for tracked resources.
//!
//! Re-fetches a resource at a fixed interval while its handle is alive and
//! publishes the latest snapshot through a watch channel. Every fetch takes a
//! generation number; a response is applied only if no fetch was started
//! after it, so a slow poll can never overwrite the result of a newer one.

use crate::engine::event_bus::EventBus;
use async_trait::async_trait;
use fooddash_api::ApiError;
use fooddash_types::{ClientEvent, Notification};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A view whose displayed state can be re-fetched from the backend.
#[async_trait]
pub trait Refreshable: Send + Sync {
	/// Re-fetches and replaces the snapshot. Failures are reported by the
	/// implementation and never propagated to the caller.
	async fn refresh(&self);
}

/// Fetch operation driven by a [`Refresher`].
pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// Maps an applied snapshot to the event announcing it.
pub type EventFn<T> = fn(&T) -> Option<ClientEvent>;

pub struct Refresher<T> {
	name: &'static str,
	fetch: FetchFn<T>,
	generation: AtomicU64,
	snapshot: watch::Sender<Option<T>>,
	event_bus: EventBus,
	event_for: Option<EventFn<T>>,
}

impl<T> Refresher<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn new(name: &'static str, fetch: FetchFn<T>, event_bus: EventBus) -> Self {
		let (snapshot, _) = watch::channel(None);
		Self {
			name,
			fetch,
			generation: AtomicU64::new(0),
			snapshot,
			event_bus,
			event_for: None,
		}
	}

	/// Publishes the event returned by `event_for` each time a snapshot is
	/// applied.
	pub fn with_event(mut self, event_for: EventFn<T>) -> Self {
		self.event_for = Some(event_for);
		self
	}

	/// Latest applied snapshot, `None` until the first successful fetch.
	pub fn current(&self) -> Option<T> {
		self.snapshot.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
		self.snapshot.subscribe()
	}

	/// Fetches once and applies the result if it is still the newest.
	///
	/// Returns `Ok(true)` when the snapshot was replaced and `Ok(false)` when
	/// the response was discarded as stale. On error the snapshot is left
	/// unchanged and a notification is published.
	pub async fn refresh_now(&self) -> Result<bool, ApiError> {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

		match (self.fetch)().await {
			Ok(value) => {
				if self.generation.load(Ordering::SeqCst) != generation {
					tracing::debug!(refresher = self.name, generation, "Discarding stale response");
					return Ok(false);
				}
				let event = self.event_for.and_then(|f| f(&value));
				self.snapshot.send_replace(Some(value));
				if let Some(event) = event {
					self.event_bus.publish(event).ok();
				}
				tracing::debug!(refresher = self.name, generation, "Snapshot replaced");
				Ok(true)
			},
			Err(e) => {
				tracing::warn!(refresher = self.name, error = %e, "Refresh failed");
				self.event_bus.notify(Notification::error(e.user_message()));
				Err(e)
			},
		}
	}

	/// Starts the polling loop. The first fetch happens immediately.
	pub fn start(self: &Arc<Self>, interval: Duration) -> RefresherHandle {
		let refresher = Arc::clone(self);
		let task = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			// A slow backend delays the next poll instead of causing a burst
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				// Errors were already reported
				let _ = refresher.refresh_now().await;
			}
		});

		tracing::info!(refresher = self.name, interval_secs = interval.as_secs(), "Polling started");
		RefresherHandle {
			name: self.name,
			task,
		}
	}
}

#[async_trait]
impl<T> Refreshable for Refresher<T>
where
	T: Clone + Send + Sync + 'static,
{
	async fn refresh(&self) {
		let _ = self.refresh_now().await;
	}
}

/// Keeps a polling loop alive. Dropping the handle stops the loop.
pub struct RefresherHandle {
	name: &'static str,
	task: JoinHandle<()>,
}

impl RefresherHandle {
	pub fn is_running(&self) -> bool {
		!self.task.is_finished()
	}
}

impl Drop for RefresherHandle {
	fn drop(&mut self) {
		self.task.abort();
		tracing::info!(refresher = self.name, "Polling stopped");
	}
}
