//! Order board of a restaurant.

use super::ViewContext;
use crate::dispatch::{ActionButton, ActionDispatcher, ActionRequest, DispatchError};
use crate::monitoring::{FetchFn, Refresher, RefresherHandle};
use fooddash_api::ApiError;
use fooddash_types::{Order, OrderStatus, Role};
use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

pub struct RestaurantBoard {
	refresher: Arc<Refresher<Vec<Order>>>,
	dispatcher: Arc<ActionDispatcher>,
	interval: Duration,
	handle: Option<RefresherHandle>,
}

impl RestaurantBoard {
	/// Board of `restaurant_id`, or of every order the backend returns when
	/// no restaurant is given.
	pub fn new(ctx: &ViewContext, restaurant_id: Option<u64>) -> Self {
		let backend = ctx.backend.clone();
		let fetch: FetchFn<Vec<Order>> = Arc::new(move || {
			let backend = backend.clone();
			async move {
				let orders = backend.list_orders().await?;
				Ok::<_, ApiError>(match restaurant_id {
					Some(id) => orders
						.into_iter()
						.filter(|o| o.restaurant_ref() == Some(id))
						.collect(),
					None => orders,
				})
			}
			.boxed()
		});

		Self {
			refresher: Arc::new(Refresher::new("restaurant_board", fetch, ctx.event_bus.clone())),
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

	pub async fn refresh(&self) -> Result<bool, ApiError> {
		self.refresher.refresh_now().await
	}

	pub fn orders(&self) -> Vec<Order> {
		self.refresher.current().unwrap_or_default()
	}

	/// Orders currently in `status`, e.g. the pending ones awaiting a decision.
	pub fn orders_with_status(&self, status: &OrderStatus) -> Vec<Order> {
		self.orders()
			.into_iter()
			.filter(|o| &o.status == status)
			.collect()
	}

	fn find(&self, order_id: u64) -> Option<Order> {
		self.orders().into_iter().find(|o| o.id == order_id)
	}

	pub async fn actions(&self, order_id: u64) -> Vec<ActionButton> {
		match self.find(order_id) {
			Some(order) => {
				self.dispatcher
					.buttons(order_id, &order.status, Role::Restaurant)
					.await
			},
			None => Vec::new(),
		}
	}

	pub async fn perform(&self, order_id: u64, target: OrderStatus) -> Result<(), DispatchError> {
		let order = self.find(order_id).ok_or(DispatchError::NotLoaded)?;
		let request = ActionRequest {
			order_id,
			current: order.status,
			role: Role::Restaurant,
			target,
			courier_id: None,
		};
		self.dispatcher
			.dispatch(request, self.refresher.as_ref())
			.await
	}
}
