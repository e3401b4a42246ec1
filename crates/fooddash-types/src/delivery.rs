//! Courier delivery assignment types.

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::{Order, OrderStatus};

/// A courier's assignment to an order.
///
/// The backend may embed the linked order, only reference it by id, or copy
/// a few of its fields onto the delivery row. [`Delivery::resolve`] hides
/// these differences from the views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
	pub id: u64,
	/// Identifier of the linked order.
	#[serde(default, alias = "orderId", skip_serializing_if = "Option::is_none")]
	pub order_id: Option<u64>,
	/// Linked order, when embedded.
	#[serde(default, alias = "Order", skip_serializing_if = "Option::is_none")]
	pub order: Option<Order>,
	/// Assigned courier.
	#[serde(
		default,
		rename = "deliveryUser_id",
		alias = "courier_id",
		alias = "userId",
		skip_serializing_if = "Option::is_none"
	)]
	pub courier_id: Option<u64>,
	/// Activity flag.
	#[serde(default, alias = "isActive", alias = "is_active", alias = "active")]
	pub activity: DeliveryActivity,
	/// Denormalised order status.
	#[serde(default, alias = "status", skip_serializing_if = "Option::is_none")]
	pub order_status: Option<OrderStatus>,
	/// Denormalised delivery address.
	#[serde(
		default,
		alias = "address",
		alias = "delivery_address",
		skip_serializing_if = "Option::is_none"
	)]
	pub order_address: Option<String>,
	/// Denormalised order total.
	#[serde(
		default,
		alias = "total_price",
		alias = "totalPrice",
		skip_serializing_if = "Option::is_none"
	)]
	pub order_total: Option<Decimal>,
}

/// Whether a delivery is still being carried out.
///
/// Sent by the backend either as a boolean or as the strings
/// `"active"`/`"inactive"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryActivity {
	#[default]
	Active,
	Inactive,
}

/// Order fields of a delivery, re-derived from the best available source.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDelivery {
	pub delivery_id: u64,
	pub order_id: Option<u64>,
	pub status: Option<OrderStatus>,
	pub address: Option<String>,
	pub total: Option<Decimal>,
}

impl Delivery {
	/// Identifier of the linked order, from the id field or the embedded order.
	pub fn linked_order_id(&self) -> Option<u64> {
		self.order_id.or_else(|| self.order.as_ref().map(|o| o.id))
	}

	/// Re-derives order fields.
	///
	/// Precedence: the freshly fetched `linked` order, then the embedded
	/// order, then the denormalised fields of the delivery row.
	pub fn resolve(&self, linked: Option<&Order>) -> ResolvedDelivery {
		match linked.or(self.order.as_ref()) {
			Some(order) => ResolvedDelivery {
				delivery_id: self.id,
				order_id: Some(order.id),
				status: Some(order.status.clone()),
				address: Some(order.delivery_address.clone()),
				total: Some(order.total_price),
			},
			None => ResolvedDelivery {
				delivery_id: self.id,
				order_id: self.order_id,
				status: self.order_status.clone(),
				address: self.order_address.clone(),
				total: self.order_total,
			},
		}
	}

	/// True while the flag is active and the linked order has not reached a
	/// status that ends the delivery.
	pub fn is_active(&self, linked: Option<&Order>) -> bool {
		if self.activity != DeliveryActivity::Active {
			return false;
		}
		!matches!(
			self.resolve(linked).status,
			Some(OrderStatus::ConfirmedByClient)
				| Some(OrderStatus::Completed)
				| Some(OrderStatus::Cancelled)
		)
	}
}

impl Serialize for DeliveryActivity {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_bool(*self == DeliveryActivity::Active)
	}
}

impl<'de> Deserialize<'de> for DeliveryActivity {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct ActivityVisitor;

		impl de::Visitor<'_> for ActivityVisitor {
			type Value = DeliveryActivity;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("a boolean, 0/1, or \"active\"/\"inactive\"")
			}

			fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
				Ok(if v {
					DeliveryActivity::Active
				} else {
					DeliveryActivity::Inactive
				})
			}

			fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
				self.visit_bool(v != 0)
			}

			fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
				self.visit_bool(v != 0)
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				match v.to_ascii_lowercase().as_str() {
					"active" | "true" | "1" => Ok(DeliveryActivity::Active),
					"inactive" | "false" | "0" => Ok(DeliveryActivity::Inactive),
					other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
				}
			}
		}

		deserializer.deserialize_any(ActivityVisitor)
	}
}

/// Body of `PUT /delivery/update/{id}`. Only the populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryUpdate {
	#[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
	pub activity: Option<DeliveryActivity>,
	#[serde(rename = "deliveryUser_id", skip_serializing_if = "Option::is_none")]
	pub courier_id: Option<u64>,
	#[serde(rename = "order_id", skip_serializing_if = "Option::is_none")]
	pub order_id: Option<u64>,
}
