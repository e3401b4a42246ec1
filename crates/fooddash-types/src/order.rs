//! Order types as exchanged with the marketplace backend.
//!
//! Field names follow the backend's snake_case convention. The aliases cover
//! the camelCase spellings some endpoints still emit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OrderStatus;

/// One customer purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Backend identifier.
	pub id: u64,
	/// Current status. Unknown strings are kept verbatim.
	pub status: OrderStatus,
	/// Total price charged to the customer.
	#[serde(default, alias = "totalPrice", alias = "total")]
	pub total_price: Decimal,
	/// Address the order is delivered to.
	#[serde(default, alias = "deliveryAddress", alias = "address")]
	pub delivery_address: String,
	/// Ordered items, in the order they were added to the cart.
	#[serde(default, alias = "OrderItems", alias = "orderItems")]
	pub items: Vec<OrderItem>,
	/// Owning customer.
	#[serde(default, alias = "userId", alias = "user_id")]
	pub customer_id: Option<u64>,
	/// Restaurant preparing the order.
	#[serde(default, alias = "restaurantId")]
	pub restaurant_id: Option<u64>,
	/// Customer summary when the backend resolves the reference.
	#[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
	pub customer: Option<CustomerSummary>,
	/// Restaurant summary when the backend resolves the reference.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub restaurant: Option<RestaurantSummary>,
	/// Creation timestamp, when provided.
	#[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<u64>,
	pub name: String,
	#[serde(alias = "price", alias = "unitPrice")]
	pub unit_price: Decimal,
	pub quantity: u32,
}

/// Customer reference resolved by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
	pub id: u64,
	#[serde(default)]
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
}

/// Restaurant reference resolved by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSummary {
	pub id: u64,
	#[serde(default)]
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}

impl OrderItem {
	pub fn line_total(&self) -> Decimal {
		self.unit_price * Decimal::from(self.quantity)
	}
}

impl Order {
	/// Customer identifier, from the id field or the embedded summary.
	pub fn owner_id(&self) -> Option<u64> {
		self.customer_id
			.or_else(|| self.customer.as_ref().map(|c| c.id))
	}

	/// Restaurant identifier, from the id field or the embedded summary.
	pub fn restaurant_ref(&self) -> Option<u64> {
		self.restaurant_id
			.or_else(|| self.restaurant.as_ref().map(|r| r.id))
	}

	/// Sum of the item lines. May differ from `total_price` when the backend
	/// adds fees.
	pub fn items_total(&self) -> Decimal {
		self.items.iter().map(OrderItem::line_total).sum()
	}

	pub fn is_terminal(&self) -> bool {
		self.status.is_terminal()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;
	use std::str::FromStr;

	#[test]
	fn test_deserialize_backend_order() {
		let json = r#"{
			"id": 42,
			"status": "waiting for pickup",
			"totalPrice": 23.5,
			"deliveryAddress": "12 rue de la Paix",
			"OrderItems": [
				{"name": "Couscous", "price": "9.50", "quantity": 2},
				{"name": "Thé", "price": 2, "quantity": 1}
			],
			"user": {"id": 7, "name": "Amina"},
			"restaurantId": 3
		}"#;

		let order: Order = serde_json::from_str(json).unwrap();
		assert_eq!(order.id, 42);
		assert_eq!(order.status, OrderStatus::WaitingForPickup);
		assert_eq!(order.total_price, Decimal::from_str("23.5").unwrap());
		assert_eq!(order.delivery_address, "12 rue de la Paix");
		assert_eq!(order.items.len(), 2);
		assert_eq!(order.owner_id(), Some(7));
		assert_eq!(order.restaurant_ref(), Some(3));
		assert_eq!(order.items_total(), Decimal::from_str("21").unwrap());
	}

	#[test]
	fn test_minimal_order_with_unknown_status() {
		let order: Order = serde_json::from_str(r#"{"id": 1, "status": "refunded"}"#).unwrap();
		assert_eq!(order.status, OrderStatus::Other("refunded".into()));
		assert!(order.items.is_empty());
		assert_eq!(order.total_price, Decimal::ZERO);
		assert!(!order.is_terminal());
	}
}
