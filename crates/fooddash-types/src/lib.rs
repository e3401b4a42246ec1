//! Common types for the fooddash client.
//!
//! This crate holds the data exchanged with the marketplace backend and the
//! status vocabulary every view shares. Behaviour built on top of these
//! types (transition table, stepper, dispatcher) lives in `fooddash-core`.

/// Bearer token handling.
pub mod access_token;
/// Request and response bodies of the REST API.
pub mod api;
/// Client-side cart lines.
pub mod cart;
/// Courier delivery assignments.
pub mod delivery;
/// Event bus payloads and notifications.
pub mod events;
/// Orders and order items.
pub mod order;
/// Actor roles.
pub mod role;
/// Order status vocabulary and labels.
pub mod status;
/// Client storage keys.
pub mod storage;
/// Display helpers.
pub mod utils;

pub use access_token::AccessToken;
pub use api::*;
pub use cart::CartItem;
pub use delivery::*;
pub use events::*;
pub use order::*;
pub use role::{Role, UnknownRole};
pub use status::{OrderStatus, CANONICAL_PROGRESSION};
pub use storage::StorageKey;
pub use utils::{format_price, truncate};
