//! Order status rules of the client.
//!
//! [`transitions`] holds the per-role transition table; [`stepper`] maps a
//! status onto the canonical progression shown to users.

pub mod stepper;
pub mod transitions;

pub use stepper::{StepDescriptor, StepState, Stepper};
pub use transitions::{ButtonStyle, Transition};
