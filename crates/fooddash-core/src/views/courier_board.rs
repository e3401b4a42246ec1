//! Available orders board of a courier.
//!
//! Lists `confirmed` orders a courier may claim. Claiming is offered only
//! while the courier holds no active delivery. When another courier was
//! faster, the backend refuses the claim and the board reloads its list.

use super::delivery_tracking::{fetch_delivery, DeliverySnapshot};
use super::ViewContext;
use crate::dispatch::{ActionButton, ActionDispatcher, DispatchError};
use crate::engine::event_bus::EventBus;
use crate::monitoring::{FetchFn, Refreshable, Refresher, RefresherHandle};
use fooddash_api::ApiError;
use fooddash_types::{ClientEvent, Order, OrderStatus};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct CourierBoardSnapshot {
	/// Orders waiting for a courier.
	pub available: Vec<Order>,
	/// The courier's current delivery, if any.
	pub delivery: Option<DeliverySnapshot>,
}

impl CourierBoardSnapshot {
	pub fn holds_active_delivery(&self) -> bool {
		self.delivery.as_ref().is_some_and(|d| d.active)
	}
}

pub struct CourierBoard {
	courier_id: u64,
	refresher: Arc<Refresher<CourierBoardSnapshot>>,
	dispatcher: Arc<ActionDispatcher>,
	event_bus: EventBus,
	interval: Duration,
	handle: Option<RefresherHandle>,
}

impl CourierBoard {
	pub fn new(ctx: &ViewContext, courier_id: u64) -> Self {
		let backend = ctx.backend.clone();
		let fetch: FetchFn<CourierBoardSnapshot> = Arc::new(move || {
			let backend = backend.clone();
			async move {
				let (orders, delivery) = futures::try_join!(
					backend.list_orders(),
					fetch_delivery(&backend, courier_id)
				)?;
				Ok::<_, ApiError>(CourierBoardSnapshot {
					available: orders
						.into_iter()
						.filter(|o| o.status == OrderStatus::Confirmed)
						.collect(),
					delivery,
				})
			}
			.boxed()
		});

		Self {
			courier_id,
			refresher: Arc::new(Refresher::new("courier_board", fetch, ctx.event_bus.clone())),
			dispatcher: ctx.dispatcher.clone(),
			event_bus: ctx.event_bus.clone(),
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

	pub async fn refresh(&self) -> Result<bool, ApiError> {
		self.refresher.refresh_now().await
	}

	pub fn snapshot(&self) -> Option<CourierBoardSnapshot> {
		self.refresher.current()
	}

	pub fn available(&self) -> Vec<Order> {
		self.snapshot().map(|s| s.available).unwrap_or_default()
	}

	/// False until loaded, and while the courier holds an active delivery.
	pub fn can_accept(&self) -> bool {
		self.snapshot()
			.is_some_and(|s| !s.holds_active_delivery())
	}

	/// One claim button per available order. Empty while the courier holds
	/// an active delivery.
	pub async fn accept_buttons(&self) -> Vec<(u64, ActionButton)> {
		let Some(snapshot) = self.snapshot() else {
			return Vec::new();
		};
		let holds_active = snapshot.holds_active_delivery();

		let mut buttons = Vec::new();
		for order in &snapshot.available {
			if let Some(button) = self
				.dispatcher
				.claim_button(order.id, &order.status, holds_active)
				.await
			{
				buttons.push((order.id, button));
			}
		}
		buttons
	}

	/// Claims `order_id` for this courier.
	pub async fn accept(&self, order_id: u64) -> Result<(), DispatchError> {
		let snapshot = self.snapshot().ok_or(DispatchError::NotLoaded)?;
		let order = snapshot
			.available
			.iter()
			.find(|o| o.id == order_id)
			.ok_or_else(|| DispatchError::ClaimRefused("order is no longer available".into()))?;

		let result = self
			.dispatcher
			.claim(
				order_id,
				&order.status,
				self.courier_id,
				snapshot.holds_active_delivery(),
				self.refresher.as_ref(),
			)
			.await;

		if let Err(DispatchError::Backend(e)) = &result {
			if e.is_already_accepted() {
				tracing::info!(order_id, "Order taken by another courier, reloading list");
				self.event_bus
					.publish(ClientEvent::ListInvalidated {
						reason: format!("order {} already accepted", order_id),
					})
					.ok();
				self.refresher.refresh().await;
			}
		}
		result
	}
}
