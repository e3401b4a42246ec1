//! Screens of the client, without their rendering.
//!
//! Each view owns a [`Refresher`](crate::monitoring::Refresher) for the data
//! it shows and derives the stepper and the action buttons from the latest
//! snapshot. Mounting starts polling; unmounting (or dropping) stops it.

pub mod courier_board;
pub mod delivery_tracking;
pub mod order_tracking;
pub mod restaurant_board;

pub use courier_board::{CourierBoard, CourierBoardSnapshot};
pub use delivery_tracking::{DeliverySnapshot, DeliveryTrackingView};
pub use order_tracking::OrderTrackingView;
pub use restaurant_board::RestaurantBoard;

use crate::dispatch::ActionDispatcher;
use crate::engine::event_bus::EventBus;
use fooddash_api::BackendService;
use std::sync::Arc;
use std::time::Duration;

/// Services shared by every view.
#[derive(Clone)]
pub struct ViewContext {
	pub backend: Arc<BackendService>,
	pub dispatcher: Arc<ActionDispatcher>,
	pub event_bus: EventBus,
	pub polling_interval: Duration,
}
