//! Order tracking view.
//!
//! Shows one order to its customer (or to the restaurant preparing it) with
//! the progress stepper and the actions the viewer's role allows.

use super::ViewContext;
use crate::dispatch::{ActionButton, ActionDispatcher, ActionRequest, DispatchError};
use crate::monitoring::{FetchFn, Refresher, RefresherHandle};
use crate::state::stepper::{self, Stepper};
use fooddash_api::ApiError;
use fooddash_types::{ClientEvent, Order, OrderStatus, Role};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub struct OrderTrackingView {
	order_id: u64,
	role: Role,
	refresher: Arc<Refresher<Order>>,
	dispatcher: Arc<ActionDispatcher>,
	interval: Duration,
	handle: Option<RefresherHandle>,
}

impl OrderTrackingView {
	pub fn new(ctx: &ViewContext, order_id: u64, role: Role) -> Self {
		let backend = ctx.backend.clone();
		let fetch: FetchFn<Order> = Arc::new(move || {
			let backend = backend.clone();
			async move { backend.get_order(order_id).await }.boxed()
		});
		let refresher = Refresher::new("order_tracking", fetch, ctx.event_bus.clone()).with_event(
			|order| {
				Some(ClientEvent::OrderRefreshed {
					order_id: order.id,
					status: order.status.clone(),
				})
			},
		);

		Self {
			order_id,
			role,
			refresher: Arc::new(refresher),
			dispatcher: ctx.dispatcher.clone(),
			interval: ctx.polling_interval,
			handle: None,
		}
	}

	pub fn order_id(&self) -> u64 {
		self.order_id
	}

	/// Starts polling. The first fetch happens immediately.
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

	/// Fetches once outside the polling schedule.
	pub async fn refresh(&self) -> Result<bool, ApiError> {
		self.refresher.refresh_now().await
	}

	pub fn order(&self) -> Option<Order> {
		self.refresher.current()
	}

	pub fn subscribe(&self) -> watch::Receiver<Option<Order>> {
		self.refresher.subscribe()
	}

	pub fn stepper(&self) -> Option<Stepper> {
		self.order().map(|order| stepper::render(&order.status))
	}

	pub async fn actions(&self) -> Vec<ActionButton> {
		match self.order() {
			Some(order) => {
				self.dispatcher
					.buttons(self.order_id, &order.status, self.role)
					.await
			},
			None => Vec::new(),
		}
	}

	/// Requests `target` for the tracked order, then re-fetches it.
	pub async fn perform(&self, target: OrderStatus) -> Result<(), DispatchError> {
		let order = self.order().ok_or(DispatchError::NotLoaded)?;
		let request = ActionRequest {
			order_id: self.order_id,
			current: order.status,
			role: self.role,
			target,
			courier_id: None,
		};
		self.dispatcher
			.dispatch(request, self.refresher.as_ref())
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::stepper::StepState;
	use crate::views::test_support::{context, order};
	use fooddash_api::MockBackendInterface;
	use std::sync::Mutex;

	/// Backend whose order status changes only when an update is accepted.
	fn stateful_backend(initial: &str) -> MockBackendInterface {
		let state = Arc::new(Mutex::new(initial.to_string()));
		let mut backend = MockBackendInterface::new();

		let read = state.clone();
		backend
			.expect_get_order()
			.returning(move |id| Ok(order(id, &read.lock().unwrap())));

		let write = state;
		backend
			.expect_update_order_status()
			.returning(move |id, request| {
				*write.lock().unwrap() = request.status.as_str().to_string();
				Ok(order(id, request.status.as_str()))
			});
		backend
	}

	#[tokio::test]
	async fn test_nothing_before_first_fetch() {
		let ctx = context(MockBackendInterface::new());
		let view = OrderTrackingView::new(&ctx, 5, Role::Customer);
		assert!(view.order().is_none());
		assert!(view.stepper().is_none());
		assert!(view.actions().await.is_empty());
		assert!(matches!(
			view.perform(OrderStatus::Cancelled).await,
			Err(DispatchError::NotLoaded)
		));
	}

	#[tokio::test]
	async fn test_customer_confirms_reception_and_converges() {
		let ctx = context(stateful_backend("confirmed by delivery"));
		let view = OrderTrackingView::new(&ctx, 5, Role::Customer);
		view.refresh().await.unwrap();

		let stepper = view.stepper().unwrap();
		assert_eq!(stepper.steps[4].state(), StepState::Current);
		let labels: Vec<_> = view.actions().await.into_iter().map(|b| b.label).collect();
		assert!(labels.contains(&"Confirmer réception".to_string()));

		view.perform(OrderStatus::ConfirmedByClient).await.unwrap();

		// The re-fetch, not the request, moved the snapshot
		let order = view.order().unwrap();
		assert_eq!(order.status, OrderStatus::ConfirmedByClient);
		assert_eq!(view.stepper().unwrap().steps[5].state(), StepState::Current);
	}

	#[tokio::test]
	async fn test_rejected_action_keeps_snapshot() {
		let mut backend = MockBackendInterface::new();
		backend
			.expect_get_order()
			.times(1)
			.returning(|id| Ok(order(id, "pending")));
		backend.expect_update_order_status().returning(|_, _| {
			Err(ApiError::Rejected {
				status: 400,
				message: "Statut invalide".into(),
			})
		});
		let ctx = context(backend);
		let view = OrderTrackingView::new(&ctx, 5, Role::Restaurant);
		view.refresh().await.unwrap();

		assert!(view.perform(OrderStatus::Confirmed).await.is_err());
		assert_eq!(view.order().unwrap().status, OrderStatus::Pending);
	}

	#[tokio::test(start_paused = true)]
	async fn test_mount_polls_and_unmount_stops() {
		let ctx = context(stateful_backend("pending"));
		let mut view = OrderTrackingView::new(&ctx, 5, Role::Customer);
		let mut rx = view.subscribe();

		view.mount();
		assert!(view.is_mounted());
		rx.changed().await.unwrap();
		assert_eq!(
			rx.borrow().as_ref().map(|o| o.status.clone()),
			Some(OrderStatus::Pending)
		);

		view.unmount();
		assert!(!view.is_mounted());
	}
}
