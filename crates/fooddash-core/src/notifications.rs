//! Transient notification tray.
//!
//! Collects [`ClientEvent::Notify`] events from the bus. Entries disappear
//! when dismissed or once older than the configured TTL. Nothing here ever
//! blocks a view.

use crate::engine::event_bus::EventBus;
use fooddash_types::{ClientEvent, Notification};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast::error::RecvError, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub struct NotificationTray {
	ttl: Duration,
	entries: RwLock<Vec<Notification>>,
}

impl NotificationTray {
	pub fn new(ttl: Duration) -> Self {
		Self {
			ttl,
			entries: RwLock::new(Vec::new()),
		}
	}

	/// Adds a notification, dropping any that have expired meanwhile.
	pub async fn push(&self, notification: Notification) {
		self.push_at(notification, chrono::Utc::now()).await;
	}

	pub(crate) async fn push_at(&self, notification: Notification, now: chrono::DateTime<chrono::Utc>) {
		let mut entries = self.entries.write().await;
		self.prune(&mut entries, now);
		entries.push(notification);
	}

	/// Removes a notification. Returns false if it was already gone.
	pub async fn dismiss(&self, id: Uuid) -> bool {
		let mut entries = self.entries.write().await;
		let before = entries.len();
		entries.retain(|n| n.id != id);
		entries.len() != before
	}

	/// Notifications still within their TTL, oldest first. Expired entries
	/// are dropped.
	pub async fn active(&self) -> Vec<Notification> {
		self.active_at(chrono::Utc::now()).await
	}

	pub(crate) async fn active_at(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<Notification> {
		let mut entries = self.entries.write().await;
		self.prune(&mut entries, now);
		entries.clone()
	}

	fn prune(&self, entries: &mut Vec<Notification>, now: chrono::DateTime<chrono::Utc>) {
		let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
		entries.retain(|n| now.signed_duration_since(n.created_at) < ttl);
	}

	/// Spawns a task feeding the tray from the bus. The task ends when the
	/// bus is dropped.
	pub fn collect_from(self: &Arc<Self>, event_bus: &EventBus) -> JoinHandle<()> {
		let tray = Arc::clone(self);
		let mut rx = event_bus.subscribe();
		tokio::spawn(async move {
			loop {
				match rx.recv().await {
					Ok(ClientEvent::Notify(notification)) => tray.push(notification).await,
					Ok(_) => {},
					Err(RecvError::Lagged(skipped)) => {
						tracing::warn!(skipped, "Notification tray lagged behind the event bus");
					},
					Err(RecvError::Closed) => break,
				}
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_dismiss() {
		let tray = NotificationTray::new(Duration::from_secs(5));
		let first = Notification::error("Impossible de contacter le serveur");
		let second = Notification::info("Commande mise à jour");
		let first_id = first.id;
		tray.push(first).await;
		tray.push(second).await;

		assert!(tray.dismiss(first_id).await);
		assert!(!tray.dismiss(first_id).await);

		let active = tray.active().await;
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].message, "Commande mise à jour");
	}

	#[tokio::test]
	async fn test_expiry() {
		let tray = NotificationTray::new(Duration::from_secs(5));
		let notification = Notification::info("bientôt expirée");
		let created = notification.created_at;
		tray.push(notification).await;

		assert_eq!(tray.active_at(created + chrono::Duration::seconds(4)).await.len(), 1);
		assert!(tray
			.active_at(created + chrono::Duration::seconds(5))
			.await
			.is_empty());
		// Expired entries are gone for good
		assert!(tray.active_at(created).await.is_empty());
	}

	#[tokio::test]
	async fn test_push_drops_expired_entries() {
		let tray = NotificationTray::new(Duration::from_secs(5));
		let old = Notification::error("Impossible de contacter le serveur");
		let created = old.created_at;
		tray.push(old).await;
		tray.push_at(
			Notification::info("Commande mise à jour"),
			created + chrono::Duration::seconds(10),
		)
		.await;

		// Pruned on push, without any read of the tray
		let entries = tray.entries.read().await;
		assert_eq!(entries.len(), 1);
		assert_eq!(entries[0].message, "Commande mise à jour");
	}

	#[tokio::test]
	async fn test_collects_from_bus() {
		let bus = EventBus::default();
		let tray = Arc::new(NotificationTray::new(Duration::from_secs(60)));
		let task = tray.collect_from(&bus);

		bus.publish(ClientEvent::ListInvalidated {
			reason: "ignored".into(),
		})
		.unwrap();
		bus.notify(Notification::success("Commande acceptée"));

		for _ in 0..50 {
			if !tray.active().await.is_empty() {
				break;
			}
			tokio::task::yield_now().await;
		}
		let active = tray.active().await;
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].message, "Commande acceptée");
		task.abort();
	}
}
