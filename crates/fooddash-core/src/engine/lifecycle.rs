//! Startup and shutdown of the client.

use super::{Client, ClientError};

impl Client {
	/// Restores the saved cart and starts feeding the notification tray.
	pub async fn initialize(&self) -> Result<(), ClientError> {
		tracing::info!(
			client = %self.config.client.id,
			role = %self.config.client.role,
			"Initializing client"
		);

		let cart = self.cart.load().await?;
		if !cart.is_empty() {
			tracing::debug!(lines = cart.len(), "Saved cart found");
		}

		let mut collector = self.collector.lock().await;
		if collector.is_none() {
			*collector = Some(self.notifications.collect_from(&self.event_bus));
		}
		Ok(())
	}

	/// Stops the notification collector. Views stop polling when dropped.
	pub async fn shutdown(&self) -> Result<(), ClientError> {
		tracing::info!("Shutting down client");

		if let Some(task) = self.collector.lock().await.take() {
			task.abort();
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::engine::event_bus::EventBus;
	use crate::engine::Client;
	use fooddash_api::{BackendService, MockBackendInterface};
	use fooddash_config::builders::config::ConfigBuilder;
	use fooddash_storage::{implementations::memory::MemoryStorage, StorageService};
	use fooddash_types::{CartItem, Notification, StorageKey};
	use rust_decimal::Decimal;
	use std::sync::Arc;
	use std::time::Duration;

	#[tokio::test]
	async fn test_initialize_restores_cart_and_collects_notifications() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let mut saved = CartItem::new(1, "Pad thaï", Decimal::new(1290, 2), 3);
		saved.quantity = 2;
		storage
			.store(StorageKey::Cart.as_str(), &vec![saved])
			.await
			.unwrap();

		let backend = Arc::new(BackendService::new(Box::new(MockBackendInterface::new())));
		let client = Client::new(
			ConfigBuilder::new().build(),
			storage,
			backend,
			EventBus::default(),
		);
		client.initialize().await.unwrap();
		assert_eq!(client.cart().count().await, 2);

		client.event_bus().notify(Notification::success("Commande envoyée"));
		let mut active = Vec::new();
		for _ in 0..50 {
			active = client.notifications().active().await;
			if !active.is_empty() {
				break;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		assert_eq!(active.len(), 1);

		client.shutdown().await.unwrap();
		assert!(client.collector.lock().await.is_none());
	}
}
