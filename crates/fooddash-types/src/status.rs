//! Order status vocabulary shared by every view.
//!
//! The backend stores the status as a free-form string. This module is the
//! one place where those strings are parsed, labelled for display and placed
//! on the canonical progression. Screens never carry their own status maps.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Status of an order as reported by the backend.
///
/// The first eight variants form the canonical vocabulary. The legacy
/// variants are older backend statuses that some restaurant screens still
/// receive; they are labelled but have no place on the progression.
/// Anything else is preserved verbatim in [`OrderStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
	Pending,
	Confirmed,
	WaitingForPickup,
	ProductPickedUp,
	ConfirmedByDelivery,
	ConfirmedByClient,
	Completed,
	Cancelled,
	/// Legacy `preparing`.
	Preparing,
	/// Legacy `ready`.
	Ready,
	/// Legacy `delivering`.
	Delivering,
	/// Legacy `delivered`.
	Delivered,
	/// Legacy `in_progress`.
	InProgress,
	/// A status string outside the known vocabulary.
	Other(String),
}

/// Canonical progression, in order. The position in this array is the
/// progression index used by the stepper.
pub const CANONICAL_PROGRESSION: [OrderStatus; 7] = [
	OrderStatus::Pending,
	OrderStatus::Confirmed,
	OrderStatus::WaitingForPickup,
	OrderStatus::ProductPickedUp,
	OrderStatus::ConfirmedByDelivery,
	OrderStatus::ConfirmedByClient,
	OrderStatus::Completed,
];

/// Wire string and display label for every known status.
const VOCABULARY: [(OrderStatus, &str, &str); 13] = [
	(OrderStatus::Pending, "pending", "En attente"),
	(OrderStatus::Confirmed, "confirmed", "Confirmée"),
	(
		OrderStatus::WaitingForPickup,
		"waiting for pickup",
		"En attente de récupération",
	),
	(
		OrderStatus::ProductPickedUp,
		"product pickedup",
		"Commande récupérée",
	),
	(
		OrderStatus::ConfirmedByDelivery,
		"confirmed by delivery",
		"Livrée par le livreur",
	),
	(
		OrderStatus::ConfirmedByClient,
		"confirmed by client",
		"Réception confirmée",
	),
	(OrderStatus::Completed, "completed", "Terminée"),
	(OrderStatus::Cancelled, "cancelled", "Annulée"),
	(OrderStatus::Preparing, "preparing", "En préparation"),
	(OrderStatus::Ready, "ready", "Prête"),
	(OrderStatus::Delivering, "delivering", "En cours de livraison"),
	(OrderStatus::Delivered, "delivered", "Livrée"),
	(OrderStatus::InProgress, "in_progress", "En cours"),
];

impl OrderStatus {
	/// Returns the exact wire value for this status.
	pub fn as_str(&self) -> &str {
		match self {
			OrderStatus::Other(raw) => raw,
			known => VOCABULARY
				.iter()
				.find(|(status, _, _)| status == known)
				.map(|(_, wire, _)| *wire)
				.unwrap_or_default(),
		}
	}

	/// Returns the human-readable label. Unknown statuses display verbatim.
	pub fn label(&self) -> &str {
		match self {
			OrderStatus::Other(raw) => raw,
			known => VOCABULARY
				.iter()
				.find(|(status, _, _)| status == known)
				.map(|(_, _, label)| *label)
				.unwrap_or_default(),
		}
	}

	/// Position on the canonical progression, or `None` for cancelled,
	/// legacy and unknown statuses.
	pub fn progression_index(&self) -> Option<usize> {
		CANONICAL_PROGRESSION.iter().position(|s| s == self)
	}

	/// `completed` and `cancelled` admit no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
	}

	/// True for the older `preparing/ready/delivering/delivered/in_progress` set.
	pub fn is_legacy(&self) -> bool {
		matches!(
			self,
			OrderStatus::Preparing
				| OrderStatus::Ready
				| OrderStatus::Delivering
				| OrderStatus::Delivered
				| OrderStatus::InProgress
		)
	}

	/// True when the status is part of the known vocabulary.
	pub fn is_known(&self) -> bool {
		!matches!(self, OrderStatus::Other(_))
	}

	/// Returns an iterator over every known status, canonical ones first.
	pub fn all() -> impl Iterator<Item = Self> {
		VOCABULARY.into_iter().map(|(status, _, _)| status)
	}
}

impl FromStr for OrderStatus {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(VOCABULARY
			.iter()
			.find(|(_, wire, _)| *wire == s)
			.map(|(status, _, _)| status.clone())
			.unwrap_or_else(|| OrderStatus::Other(s.to_string())))
	}
}

impl From<&str> for OrderStatus {
	fn from(s: &str) -> Self {
		match s.parse() {
			Ok(status) => status,
			Err(never) => match never {},
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for OrderStatus {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for OrderStatus {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		Ok(OrderStatus::from(raw.as_str()))
	}
}
