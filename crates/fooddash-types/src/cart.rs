//! Shopping cart line type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the client-side cart. Never sent to the backend as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
	pub item_id: u64,
	pub name: String,
	pub price: Decimal,
	/// Always at least 1; a line reaching 0 is removed from the cart.
	pub quantity: u32,
	pub restaurant_id: u64,
}

impl CartItem {
	/// A new line with quantity 1.
	pub fn new(item_id: u64, name: impl Into<String>, price: Decimal, restaurant_id: u64) -> Self {
		Self {
			item_id,
			name: name.into(),
			price,
			quantity: 1,
			restaurant_id,
		}
	}

	pub fn line_total(&self) -> Decimal {
		self.price * Decimal::from(self.quantity)
	}
}
