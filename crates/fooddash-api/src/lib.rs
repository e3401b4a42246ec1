//! Marketplace backend client.
//!
//! The backend is the single authority on order and delivery state. This
//! crate defines the interface the views talk to, an HTTP implementation of
//! the REST contract, and the error taxonomy the views surface to users.

use async_trait::async_trait;
use fooddash_config::Config;
use fooddash_storage::StorageService;
use fooddash_types::{
	truncate, Delivery, DeliveryUpdate, Order, OrderStatus, StatusUpdateRequest,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors returned by backend calls.
///
/// Views handle all variants the same way (log, notify, keep the current
/// snapshot); the split exists so logs and tests can tell them apart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
	/// The request never got an HTTP response (connection, timeout, TLS).
	#[error("Network error: {0}")]
	Network(String),
	/// The backend answered with a non-success status.
	#[error("Request rejected ({status}): {message}")]
	Rejected { status: u16, message: String },
	/// The response body did not have the expected shape.
	#[error("Malformed response: {0}")]
	Malformed(String),
	/// The client could not be constructed.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Backend messages meaning another courier claimed the order first.
const ALREADY_ACCEPTED_MARKERS: [&str; 2] = ["déjà été acceptée", "already accepted"];

impl ApiError {
	/// True when the backend refused a claim because another courier
	/// accepted the order first.
	pub fn is_already_accepted(&self) -> bool {
		match self {
			ApiError::Rejected { message, .. } => {
				let message = message.to_lowercase();
				ALREADY_ACCEPTED_MARKERS
					.iter()
					.any(|marker| message.contains(marker))
			},
			_ => false,
		}
	}

	/// Text suitable for a user notification.
	pub fn user_message(&self) -> String {
		match self {
			ApiError::Network(_) => "Impossible de contacter le serveur".to_string(),
			ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
			ApiError::Rejected { status, .. } => format!("Requête refusée ({})", status),
			ApiError::Malformed(_) => "Réponse inattendue du serveur".to_string(),
			ApiError::Configuration(e) => e.clone(),
		}
	}
}

/// Operations of the marketplace REST API used by the views.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BackendInterface: Send + Sync {
	/// `GET /orders/getOrder/{id}`.
	async fn get_order(&self, order_id: u64) -> Result<Order, ApiError>;

	/// `GET /orders/getAll`.
	async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

	/// `PUT /orders/update/{id}` with `{status, deliveryUser_id?}`.
	async fn update_order_status(
		&self,
		order_id: u64,
		request: &StatusUpdateRequest,
	) -> Result<Order, ApiError>;

	/// `GET /delivery/getDeliveryByUser/{userId}`. `None` when the courier
	/// holds no delivery.
	async fn get_delivery_by_user(&self, user_id: u64) -> Result<Option<Delivery>, ApiError>;

	/// `PUT /delivery/update/{id}`.
	async fn update_delivery(
		&self,
		delivery_id: u64,
		update: &DeliveryUpdate,
	) -> Result<Delivery, ApiError>;
}

/// Type alias for backend factory functions.
pub type BackendFactory =
	fn(&Config, Arc<StorageService>) -> Result<Box<dyn BackendInterface>, ApiError>;

/// Traced front of a [`BackendInterface`].
///
/// Every call is logged; failures are logged at `warn` with the error kind
/// and returned unchanged. Nothing is retried.
pub struct BackendService {
	backend: Box<dyn BackendInterface>,
}

impl BackendService {
	pub fn new(backend: Box<dyn BackendInterface>) -> Self {
		Self { backend }
	}

	#[instrument(skip(self))]
	pub async fn get_order(&self, order_id: u64) -> Result<Order, ApiError> {
		let result = self.backend.get_order(order_id).await;
		log_outcome("get_order", &result);
		result
	}

	#[instrument(skip(self))]
	pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
		let result = self.backend.list_orders().await;
		if let Ok(orders) = &result {
			tracing::debug!(count = orders.len(), "Listed orders");
		}
		log_outcome("list_orders", &result);
		result
	}

	/// Requests a status change. The returned order is informational only;
	/// views re-fetch before changing what they display.
	#[instrument(skip(self), fields(status = %status))]
	pub async fn transition(
		&self,
		order_id: u64,
		status: OrderStatus,
		courier_id: Option<u64>,
	) -> Result<Order, ApiError> {
		let mut request = StatusUpdateRequest::new(status);
		if let Some(courier_id) = courier_id {
			request = request.with_courier(courier_id);
		}
		let result = self.backend.update_order_status(order_id, &request).await;
		log_outcome("update_order_status", &result);
		result
	}

	#[instrument(skip(self))]
	pub async fn get_delivery_by_user(&self, user_id: u64) -> Result<Option<Delivery>, ApiError> {
		let result = self.backend.get_delivery_by_user(user_id).await;
		log_outcome("get_delivery_by_user", &result);
		result
	}

	#[instrument(skip(self, update))]
	pub async fn update_delivery(
		&self,
		delivery_id: u64,
		update: &DeliveryUpdate,
	) -> Result<Delivery, ApiError> {
		let result = self.backend.update_delivery(delivery_id, update).await;
		log_outcome("update_delivery", &result);
		result
	}

	/// Fetches the courier's delivery and, when it references an order, the
	/// linked order so that views can re-derive order fields from it.
	///
	/// A failure to fetch the linked order is not fatal: the delivery is
	/// returned with `None` and the denormalised fields are used instead.
	pub async fn delivery_with_order(
		&self,
		user_id: u64,
	) -> Result<Option<(Delivery, Option<Order>)>, ApiError> {
		let Some(delivery) = self.get_delivery_by_user(user_id).await? else {
			return Ok(None);
		};

		let order = match delivery.linked_order_id() {
			Some(order_id) => match self.get_order(order_id).await {
				Ok(order) => Some(order),
				Err(e) => {
					tracing::warn!(
						delivery_id = delivery.id,
						order_id,
						error = %e,
						"Linked order unavailable, using delivery fields"
					);
					None
				},
			},
			None => None,
		};

		Ok(Some((delivery, order)))
	}
}

fn log_outcome<T>(operation: &str, result: &Result<T, ApiError>) {
	match result {
		Ok(_) => tracing::debug!(operation, "Backend call succeeded"),
		Err(e) => tracing::warn!(
			operation,
			error = %truncate(&e.to_string(), 160),
			"Backend call failed"
		),
	}
}

/// Get all registered backend implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, BackendFactory)> {
	vec![(
		implementations::http::NAME,
		implementations::http::create_backend as BackendFactory,
	)]
}

#[cfg(test)]
mod tests {
	use super::*;
	use mockall::predicate::eq;

	fn order(id: u64, status: &str) -> Order {
		serde_json::from_value(serde_json::json!({"id": id, "status": status})).unwrap()
	}

	#[tokio::test]
	async fn test_transition_builds_request() {
		let mut backend = MockBackendInterface::new();
		backend
			.expect_update_order_status()
			.withf(|id, request| {
				*id == 4
					&& request.status == OrderStatus::Cancelled
					&& request.courier_id == Some(12)
			})
			.times(1)
			.returning(|id, _| Ok(order(id, "cancelled")));

		let service = BackendService::new(Box::new(backend));
		let updated = service
			.transition(4, OrderStatus::Cancelled, Some(12))
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Cancelled);
	}

	#[tokio::test]
	async fn test_delivery_with_order_falls_back() {
		let mut backend = MockBackendInterface::new();
		backend.expect_get_delivery_by_user().with(eq(9)).returning(|_| {
			Ok(Some(
				serde_json::from_value(serde_json::json!({"id": 1, "order_id": 77, "status": "pending"}))
					.unwrap(),
			))
		});
		backend
			.expect_get_order()
			.with(eq(77))
			.returning(|_| Err(ApiError::Network("timeout".into())));

		let service = BackendService::new(Box::new(backend));
		let (delivery, order) = service.delivery_with_order(9).await.unwrap().unwrap();
		assert!(order.is_none());
		assert_eq!(delivery.resolve(None).status, Some(OrderStatus::Pending));
	}

	#[tokio::test]
	async fn test_delivery_with_order_none() {
		let mut backend = MockBackendInterface::new();
		backend.expect_get_delivery_by_user().returning(|_| Ok(None));
		backend.expect_get_order().never();

		let service = BackendService::new(Box::new(backend));
		assert!(service.delivery_with_order(9).await.unwrap().is_none());
	}

	#[test]
	fn test_already_accepted_detection() {
		let french = ApiError::Rejected {
			status: 409,
			message: "Cette commande a déjà été acceptée par un autre livreur".into(),
		};
		assert!(french.is_already_accepted());

		let english = ApiError::Rejected {
			status: 400,
			message: "Order ALREADY ACCEPTED by another courier".into(),
		};
		assert!(english.is_already_accepted());

		let other = ApiError::Rejected {
			status: 400,
			message: "Invalid status".into(),
		};
		assert!(!other.is_already_accepted());
		assert!(!ApiError::Network("already accepted".into()).is_already_accepted());
	}

	#[test]
	fn test_user_message() {
		assert_eq!(
			ApiError::Rejected {
				status: 403,
				message: String::new()
			}
			.user_message(),
			"Requête refusée (403)"
		);
		assert_eq!(
			ApiError::Network("refused".into()).user_message(),
			"Impossible de contacter le serveur"
		);
	}
}
