//! Background re-fetching of tracked orders and deliveries.
//!
//! Tracking views never receive pushed updates; they poll the backend on a
//! fixed interval while mounted and after each successful action.

pub mod refresher;

pub use refresher::{EventFn, FetchFn, Refreshable, Refresher, RefresherHandle};
