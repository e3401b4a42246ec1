//! Order lifecycle client of the fooddash marketplace.
//!
//! The backend is the source of truth for every order. This crate decides
//! which status changes each role may request, submits them, and keeps the
//! tracking views in step with the backend by polling. It also holds the
//! client-side pieces around that: the notification tray and the cart.

pub mod builder;
pub mod cart;
pub mod dispatch;
pub mod engine;
pub mod monitoring;
pub mod notifications;
pub mod state;
pub mod views;

pub use builder::{BuilderError, ClientBuilder, ClientFactories};
pub use cart::{CartSnapshot, CartStore};
pub use dispatch::{ActionButton, ActionDispatcher, ActionRequest, DispatchError};
pub use engine::{event_bus::EventBus, Client, ClientError};
pub use notifications::NotificationTray;
pub use state::{stepper, transitions};
pub use views::{
	CourierBoard, CourierBoardSnapshot, DeliverySnapshot, DeliveryTrackingView,
	OrderTrackingView, RestaurantBoard, ViewContext,
};
