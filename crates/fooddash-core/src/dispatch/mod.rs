//! Action dispatcher.
//!
//! Turns the transition table into action buttons and submits the chosen
//! transition. Local state is never changed optimistically: after the
//! backend accepts a request the owning view re-fetches, and only that
//! re-fetch changes what is displayed.

use crate::engine::event_bus::EventBus;
use crate::monitoring::Refreshable;
use crate::state::transitions::{self, ButtonStyle, Transition, CLAIM};
use fooddash_api::{ApiError, BackendService};
use fooddash_types::{ClientEvent, Notification, OrderStatus, Role};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::instrument;

/// Errors returned when an action is refused or fails.
#[derive(Debug, Error)]
pub enum DispatchError {
	/// The transition table does not allow this request; nothing was sent.
	#[error("{role} may not move order from '{from}' to '{to}'")]
	NotPermitted {
		role: Role,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// A claim was refused locally; nothing was sent.
	#[error("Order cannot be claimed: {0}")]
	ClaimRefused(String),
	/// The view has no snapshot to act on yet.
	#[error("Nothing loaded to act on yet")]
	NotLoaded,
	/// A request for this order is already awaiting the backend.
	#[error("A request for order {0} is already in flight")]
	InFlight(u64),
	/// The backend refused or could not be reached.
	#[error(transparent)]
	Backend(#[from] ApiError),
}

/// Presentation of one action, as a front end renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
	pub label: String,
	pub icon: &'static str,
	pub style: ButtonStyle,
	pub request_status: OrderStatus,
	/// True while a request for the same order is in flight.
	pub disabled: bool,
}

impl ActionButton {
	fn from_transition(transition: &Transition, disabled: bool) -> Self {
		Self {
			label: transition.label.to_string(),
			icon: transition.icon,
			style: transition.style,
			request_status: transition.target.clone(),
			disabled,
		}
	}
}

/// A status change requested by an actor.
#[derive(Debug, Clone)]
pub struct ActionRequest {
	pub order_id: u64,
	/// Status the actor currently sees.
	pub current: OrderStatus,
	pub role: Role,
	pub target: OrderStatus,
	/// Courier on whose behalf the request is made. Sent with courier
	/// cancellations so the backend can release the delivery.
	pub courier_id: Option<u64>,
}

/// Marks an order as in flight until dropped, including when the
/// submitting future is cancelled mid-request.
struct InFlightGuard<'a> {
	set: &'a Mutex<HashSet<u64>>,
	order_id: u64,
}

impl<'a> InFlightGuard<'a> {
	/// `None` when the order is already in flight.
	fn acquire(set: &'a Mutex<HashSet<u64>>, order_id: u64) -> Option<Self> {
		if !lock(set).insert(order_id) {
			return None;
		}
		Some(Self { set, order_id })
	}
}

impl Drop for InFlightGuard<'_> {
	fn drop(&mut self) {
		lock(self.set).remove(&self.order_id);
	}
}

// The set holds plain ids, so a poisoned lock is still consistent.
fn lock(set: &Mutex<HashSet<u64>>) -> MutexGuard<'_, HashSet<u64>> {
	set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ActionDispatcher {
	backend: Arc<BackendService>,
	event_bus: EventBus,
	in_flight: Mutex<HashSet<u64>>,
}

impl ActionDispatcher {
	pub fn new(backend: Arc<BackendService>, event_bus: EventBus) -> Self {
		Self {
			backend,
			event_bus,
			in_flight: Mutex::new(HashSet::new()),
		}
	}

	/// Buttons offered to `role` on an order in `status`.
	pub async fn buttons(&self, order_id: u64, status: &OrderStatus, role: Role) -> Vec<ActionButton> {
		let disabled = self.is_in_flight(order_id);
		transitions::transitions_for(status, role)
			.iter()
			.map(|t| ActionButton::from_transition(t, disabled))
			.collect()
	}

	/// Claim button of the courier board, if the order can be claimed.
	pub async fn claim_button(
		&self,
		order_id: u64,
		status: &OrderStatus,
		holds_active_delivery: bool,
	) -> Option<ActionButton> {
		if !transitions::can_claim(status, holds_active_delivery) {
			return None;
		}
		let disabled = self.is_in_flight(order_id);
		Some(ActionButton::from_transition(&CLAIM, disabled))
	}

	pub fn is_in_flight(&self, order_id: u64) -> bool {
		lock(&self.in_flight).contains(&order_id)
	}

	/// Submits a transition and re-fetches `owner` once the backend accepts.
	///
	/// Requests the table does not allow are refused without contacting the
	/// backend. Backend failures are published as notifications and returned.
	#[instrument(skip(self, request, owner), fields(order_id = request.order_id, to = %request.target))]
	pub async fn dispatch(
		&self,
		request: ActionRequest,
		owner: &dyn Refreshable,
	) -> Result<(), DispatchError> {
		if !transitions::is_permitted(&request.current, request.role, &request.target) {
			tracing::warn!(role = %request.role, from = %request.current, "Transition refused locally");
			return Err(DispatchError::NotPermitted {
				role: request.role,
				from: request.current,
				to: request.target,
			});
		}

		// Only courier cancellations carry the courier id
		let courier_id = match (request.role, &request.target) {
			(Role::Courier, OrderStatus::Cancelled) => request.courier_id,
			_ => None,
		};

		self.submit(request.order_id, request.target, courier_id, owner)
			.await
	}

	/// Claims a `confirmed` order for `courier_id` from the courier board.
	#[instrument(skip(self, owner))]
	pub async fn claim(
		&self,
		order_id: u64,
		current: &OrderStatus,
		courier_id: u64,
		holds_active_delivery: bool,
		owner: &dyn Refreshable,
	) -> Result<(), DispatchError> {
		if holds_active_delivery {
			return Err(DispatchError::ClaimRefused(
				"courier already holds an active delivery".into(),
			));
		}
		if !transitions::can_claim(current, holds_active_delivery) {
			return Err(DispatchError::ClaimRefused(format!(
				"order is '{}', not confirmed",
				current
			)));
		}

		self.submit(order_id, CLAIM.target.clone(), Some(courier_id), owner)
			.await
	}

	async fn submit(
		&self,
		order_id: u64,
		target: OrderStatus,
		courier_id: Option<u64>,
		owner: &dyn Refreshable,
	) -> Result<(), DispatchError> {
		let Some(guard) = InFlightGuard::acquire(&self.in_flight, order_id) else {
			tracing::debug!(order_id, "Ignoring double submit");
			return Err(DispatchError::InFlight(order_id));
		};

		let result = self
			.backend
			.transition(order_id, target.clone(), courier_id)
			.await;
		drop(guard);

		match result {
			Ok(_) => {
				tracing::info!(order_id, status = %target, "Transition accepted");
				self.event_bus
					.publish(ClientEvent::TransitionSubmitted {
						order_id,
						requested: target,
					})
					.ok();
				owner.refresh().await;
				Ok(())
			},
			Err(e) => {
				tracing::warn!(order_id, status = %target, error = %e, "Transition failed");
				self.event_bus.notify(Notification::error(e.user_message()));
				Err(DispatchError::Backend(e))
			},
		}
	}
}
