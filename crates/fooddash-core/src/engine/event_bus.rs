//! Broadcast event bus shared by views, the dispatcher and the notification
//! tray.

use fooddash_types::{ClientEvent, Notification};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// Cloneable handle to the client's broadcast channel.
///
/// Publishing never blocks. Events published while nobody is subscribed are
/// dropped, and a subscriber that falls behind by more than the capacity
/// receives `Lagged` on its next `recv`.
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<ClientEvent>,
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event. Returns the number of subscribers reached.
	pub fn publish(&self, event: ClientEvent) -> Result<usize, broadcast::error::SendError<ClientEvent>> {
		self.sender.send(event)
	}

	/// Shorthand for publishing a [`ClientEvent::Notify`].
	pub fn notify(&self, notification: Notification) {
		self.publish(ClientEvent::Notify(notification)).ok();
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
		self.sender.subscribe()
	}

	pub fn receiver_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fooddash_types::OrderStatus;

	#[tokio::test]
	async fn test_publish_reaches_subscribers() {
		let bus = EventBus::default();
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();

		let reached = bus
			.publish(ClientEvent::OrderRefreshed {
				order_id: 3,
				status: OrderStatus::Confirmed,
			})
			.unwrap();
		assert_eq!(reached, 2);

		for rx in [&mut first, &mut second] {
			match rx.recv().await.unwrap() {
				ClientEvent::OrderRefreshed { order_id, .. } => assert_eq!(order_id, 3),
				other => panic!("unexpected event {:?}", other),
			}
		}
	}

	#[test]
	fn test_notify_without_subscribers_is_silent() {
		let bus = EventBus::new(4);
		assert_eq!(bus.receiver_count(), 0);
		bus.notify(Notification::info("nobody listens"));
		assert!(bus
			.publish(ClientEvent::ListInvalidated {
				reason: "x".into()
			})
			.is_err());
	}
}
