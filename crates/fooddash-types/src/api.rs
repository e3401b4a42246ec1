//! Request and response bodies of the marketplace REST API.

use serde::{Deserialize, Serialize};

use crate::{Order, OrderStatus};

/// Response of `GET /orders/getOrder/{id}` and `PUT /orders/update/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEnvelope {
	pub order: Order,
}

/// Response of `GET /orders/getAll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersEnvelope {
	#[serde(default)]
	pub orders: Vec<Order>,
}

/// Body of `PUT /orders/update/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
	pub status: OrderStatus,
	/// Courier identifier, sent when a courier claims or cancels a delivery.
	#[serde(
		rename = "deliveryUser_id",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub courier_id: Option<u64>,
}

impl StatusUpdateRequest {
	pub fn new(status: OrderStatus) -> Self {
		Self {
			status,
			courier_id: None,
		}
	}

	pub fn with_courier(mut self, courier_id: u64) -> Self {
		self.courier_id = Some(courier_id);
		self
	}
}

/// Error body returned by the backend on rejected requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
	#[serde(default, alias = "error")]
	pub message: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_update_body() {
		let body = StatusUpdateRequest::new(OrderStatus::Cancelled).with_courier(4);
		assert_eq!(
			serde_json::to_value(&body).unwrap(),
			serde_json::json!({"status": "cancelled", "deliveryUser_id": 4})
		);

		let body = StatusUpdateRequest::new(OrderStatus::ProductPickedUp);
		assert_eq!(
			serde_json::to_value(&body).unwrap(),
			serde_json::json!({"status": "product pickedup"})
		);
	}

	#[test]
	fn test_error_body_accepts_error_or_message() {
		let body: ErrorBody = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
		assert_eq!(body.message.as_deref(), Some("nope"));
		let body: ErrorBody = serde_json::from_str(r#"{"message": "nope"}"#).unwrap();
		assert_eq!(body.message.as_deref(), Some("nope"));
	}
}
