//! The fooddash client.
//!
//! [`Client`] ties the services together: configuration, client storage,
//! the backend, the event bus, the action dispatcher, the notification tray
//! and the cart. Views are created from it and share its services.

pub mod event_bus;
pub mod lifecycle;

use crate::cart::CartStore;
use crate::dispatch::{ActionDispatcher, DispatchError};
use crate::notifications::NotificationTray;
use crate::views::{
	CourierBoard, DeliveryTrackingView, OrderTrackingView, RestaurantBoard, ViewContext,
};
use event_bus::EventBus;
use fooddash_api::{ApiError, BackendService};
use fooddash_config::Config;
use fooddash_storage::{StorageError, StorageService};
use fooddash_types::Role;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Backend error: {0}")]
	Api(#[from] ApiError),
	#[error("Action error: {0}")]
	Dispatch(#[from] DispatchError),
	#[error("client.user_id is required for the {0} views")]
	MissingUserId(Role),
}

pub struct Client {
	pub(crate) config: Config,
	pub(crate) storage: Arc<StorageService>,
	pub(crate) backend: Arc<BackendService>,
	pub(crate) event_bus: EventBus,
	pub(crate) dispatcher: Arc<ActionDispatcher>,
	pub(crate) notifications: Arc<NotificationTray>,
	pub(crate) cart: Arc<CartStore>,
	/// Task feeding the tray from the event bus, set by `initialize`.
	pub(crate) collector: Mutex<Option<JoinHandle<()>>>,
}

impl Client {
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		backend: Arc<BackendService>,
		event_bus: EventBus,
	) -> Self {
		let dispatcher = Arc::new(ActionDispatcher::new(backend.clone(), event_bus.clone()));
		let notifications = Arc::new(NotificationTray::new(config.notifications.ttl()));
		let cart = Arc::new(CartStore::persistent(storage.clone()));

		Self {
			config,
			storage,
			backend,
			event_bus,
			dispatcher,
			notifications,
			cart,
			collector: Mutex::new(None),
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn role(&self) -> Role {
		self.config.client.role
	}

	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	pub fn backend(&self) -> &Arc<BackendService> {
		&self.backend
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	pub fn dispatcher(&self) -> &Arc<ActionDispatcher> {
		&self.dispatcher
	}

	pub fn notifications(&self) -> &Arc<NotificationTray> {
		&self.notifications
	}

	pub fn cart(&self) -> &Arc<CartStore> {
		&self.cart
	}

	pub fn view_context(&self) -> ViewContext {
		ViewContext {
			backend: self.backend.clone(),
			dispatcher: self.dispatcher.clone(),
			event_bus: self.event_bus.clone(),
			polling_interval: self.config.polling.interval(),
		}
	}

	/// Tracking view of one order, acting as the configured role.
	pub fn order_tracking(&self, order_id: u64) -> OrderTrackingView {
		OrderTrackingView::new(&self.view_context(), order_id, self.role())
	}

	/// Delivery view of the configured courier.
	pub fn delivery_tracking(&self) -> Result<DeliveryTrackingView, ClientError> {
		let courier_id = self.require_user_id(Role::Courier)?;
		Ok(DeliveryTrackingView::new(&self.view_context(), courier_id))
	}

	pub fn restaurant_board(&self, restaurant_id: Option<u64>) -> RestaurantBoard {
		RestaurantBoard::new(&self.view_context(), restaurant_id)
	}

	/// Available orders board of the configured courier.
	pub fn courier_board(&self) -> Result<CourierBoard, ClientError> {
		let courier_id = self.require_user_id(Role::Courier)?;
		Ok(CourierBoard::new(&self.view_context(), courier_id))
	}

	/// Saves the bearer token sent with every backend request.
	pub async fn set_access_token(&self, token: &str) -> Result<(), ClientError> {
		self.storage
			.set_string(&self.config.auth.token_key, token.trim())
			.await?;
		tracing::info!("Access token saved");
		Ok(())
	}

	pub async fn clear_access_token(&self) -> Result<(), ClientError> {
		self.storage.remove(&self.config.auth.token_key).await?;
		tracing::info!("Access token cleared");
		Ok(())
	}

	pub async fn has_access_token(&self) -> bool {
		!self
			.storage
			.access_token(&self.config.auth.token_key)
			.await
			.is_empty()
	}

	fn require_user_id(&self, role: Role) -> Result<u64, ClientError> {
		self.config
			.client
			.user_id
			.ok_or(ClientError::MissingUserId(role))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fooddash_api::MockBackendInterface;
	use fooddash_config::builders::config::ConfigBuilder;
	use fooddash_storage::implementations::memory::MemoryStorage;

	fn client(config: Config) -> Client {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let backend = Arc::new(BackendService::new(Box::new(MockBackendInterface::new())));
		Client::new(config, storage, backend, EventBus::default())
	}

	#[tokio::test]
	async fn test_courier_views_need_user_id() {
		let customer = client(ConfigBuilder::new().build());
		assert!(matches!(
			customer.courier_board(),
			Err(ClientError::MissingUserId(Role::Courier))
		));
		assert!(customer.delivery_tracking().is_err());

		let courier = client(ConfigBuilder::new().role(Role::Courier).user_id(4).build());
		assert!(courier.courier_board().is_ok());
		assert!(courier.delivery_tracking().is_ok());
	}

	#[tokio::test]
	async fn test_access_token_roundtrip() {
		let client = client(ConfigBuilder::new().token_key("tok").build());
		assert!(!client.has_access_token().await);

		client.set_access_token(" abc \n").await.unwrap();
		assert_eq!(
			client.storage().get_string("tok").await.unwrap().as_deref(),
			Some("abc")
		);
		assert!(client.has_access_token().await);

		client.clear_access_token().await.unwrap();
		assert!(!client.has_access_token().await);
	}

	#[tokio::test]
	async fn test_views_use_configured_polling_interval() {
		let client = client(ConfigBuilder::new().polling_interval_seconds(7).build());
		assert_eq!(
			client.view_context().polling_interval,
			std::time::Duration::from_secs(7)
		);
		assert_eq!(client.order_tracking(3).order_id(), 3);
	}
}
