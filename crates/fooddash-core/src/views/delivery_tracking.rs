//! Delivery tracking view of a courier.
//!
//! Shows the courier's current delivery. Order fields are always re-derived
//! from the linked order when it could be fetched, falling back to the
//! fields copied onto the delivery row.

use super::ViewContext;
use crate::dispatch::{ActionButton, ActionDispatcher, ActionRequest, DispatchError};
use crate::monitoring::{FetchFn, Refresher, RefresherHandle};
use crate::state::stepper::{self, Stepper};
use fooddash_api::{ApiError, BackendService};
use fooddash_types::{ClientEvent, Delivery, Order, OrderStatus, ResolvedDelivery, Role};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

/// A delivery together with its linked order and the resolved order fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySnapshot {
	pub delivery: Delivery,
	pub order: Option<Order>,
	pub resolved: ResolvedDelivery,
	pub active: bool,
}

impl DeliverySnapshot {
	pub fn new(delivery: Delivery, order: Option<Order>) -> Self {
		let resolved = delivery.resolve(order.as_ref());
		let active = delivery.is_active(order.as_ref());
		Self {
			delivery,
			order,
			resolved,
			active,
		}
	}
}

/// Fetches the courier's delivery. `Ok(None)` means no delivery is assigned.
pub(crate) async fn fetch_delivery(
	backend: &BackendService,
	courier_id: u64,
) -> Result<Option<DeliverySnapshot>, ApiError> {
	Ok(backend
		.delivery_with_order(courier_id)
		.await?
		.map(|(delivery, order)| DeliverySnapshot::new(delivery, order)))
}

pub struct DeliveryTrackingView {
	courier_id: u64,
	refresher: Arc<Refresher<Option<DeliverySnapshot>>>,
	dispatcher: Arc<ActionDispatcher>,
	interval: Duration,
	handle: Option<RefresherHandle>,
}

impl DeliveryTrackingView {
	pub fn new(ctx: &ViewContext, courier_id: u64) -> Self {
		let backend = ctx.backend.clone();
		let fetch: FetchFn<Option<DeliverySnapshot>> = Arc::new(move || {
			let backend = backend.clone();
			async move { fetch_delivery(&backend, courier_id).await }.boxed()
		});
		let refresher = Refresher::new("delivery_tracking", fetch, ctx.event_bus.clone())
			.with_event(|snapshot| {
				Some(ClientEvent::DeliveryRefreshed {
					delivery_id: snapshot.as_ref().map(|s| s.delivery.id),
					status: snapshot.as_ref().and_then(|s| s.resolved.status.clone()),
				})
			});

		Self {
			courier_id,
			refresher: Arc::new(refresher),
			dispatcher: ctx.dispatcher.clone(),
			interval: ctx.polling_interval,
			handle: None,
		}
	}

	pub fn mount(&mut self) {
		if self.handle.is_none() {
			self.handle = Some(self.refresher.start(self.interval));
		}
	}

	pub fn unmount(&mut self) {
		self.handle = None;
	}

	pub fn is_mounted(&self) -> bool {
		self.handle.is_some()
	}

	pub async fn refresh(&self) -> Result<bool, ApiError> {
		self.refresher.refresh_now().await
	}

	/// True once a fetch succeeded, whether or not a delivery was found.
	pub fn is_loaded(&self) -> bool {
		self.refresher.current().is_some()
	}

	pub fn delivery(&self) -> Option<DeliverySnapshot> {
		self.refresher.current().flatten()
	}

	pub fn stepper(&self) -> Option<Stepper> {
		let status = self.delivery()?.resolved.status?;
		Some(stepper::render(&status))
	}

	pub async fn actions(&self) -> Vec<ActionButton> {
		let Some(snapshot) = self.delivery() else {
			return Vec::new();
		};
		match (snapshot.resolved.order_id, snapshot.resolved.status.as_ref()) {
			(Some(order_id), Some(status)) => {
				self.dispatcher
					.buttons(order_id, status, Role::Courier)
					.await
			},
			_ => Vec::new(),
		}
	}

	/// Requests `target` for the delivered order, then re-fetches.
	pub async fn perform(&self, target: OrderStatus) -> Result<(), DispatchError> {
		let snapshot = self.delivery().ok_or(DispatchError::NotLoaded)?;
		let (Some(order_id), Some(current)) = (snapshot.resolved.order_id, snapshot.resolved.status)
		else {
			return Err(DispatchError::NotLoaded);
		};

		let request = ActionRequest {
			order_id,
			current,
			role: Role::Courier,
			target,
			courier_id: Some(self.courier_id),
		};
		self.dispatcher
			.dispatch(request, self.refresher.as_ref())
			.await
	}
}
