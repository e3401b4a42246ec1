//! Display helpers shared by the CLI and log statements.

pub mod formatting;

pub use formatting::{format_price, truncate};
