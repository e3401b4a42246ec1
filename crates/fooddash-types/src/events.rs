//! Events published on the client event bus.
//!
//! Views publish refresh results and failures here; the front end renders
//! notifications from [`ClientEvent::Notify`] and may ignore the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::OrderStatus;

/// Main event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientEvent {
	/// A transient message for the user.
	Notify(Notification),
	/// A tracked order was re-fetched and its snapshot replaced.
	OrderRefreshed { order_id: u64, status: OrderStatus },
	/// A tracked delivery was re-fetched.
	DeliveryRefreshed {
		delivery_id: Option<u64>,
		status: Option<OrderStatus>,
	},
	/// A status change was accepted by the backend.
	TransitionSubmitted {
		order_id: u64,
		requested: OrderStatus,
	},
	/// A list view was reloaded, e.g. after another courier took an order.
	ListInvalidated { reason: String },
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
	Info,
	Success,
	Warning,
	Error,
}

/// A dismissible, transient message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
	pub id: Uuid,
	pub level: NotificationLevel,
	pub message: String,
	pub created_at: DateTime<Utc>,
}

impl Notification {
	pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4(),
			level,
			message: message.into(),
			created_at: Utc::now(),
		}
	}

	pub fn info(message: impl Into<String>) -> Self {
		Self::new(NotificationLevel::Info, message)
	}

	pub fn success(message: impl Into<String>) -> Self {
		Self::new(NotificationLevel::Success, message)
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self::new(NotificationLevel::Error, message)
	}
}
