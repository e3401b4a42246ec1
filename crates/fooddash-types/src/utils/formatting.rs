//! String formatting utilities.

use rust_decimal::Decimal;

/// Shortens free text (addresses, backend messages) for log lines.
///
/// Keeps the first `max` characters and appends "..".
pub fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		text.to_string()
	} else {
		let head: String = text.chars().take(max).collect();
		format!("{}..", head)
	}
}

/// Formats a price with two decimals and the euro sign.
pub fn format_price(amount: Decimal) -> String {
	format!("{:.2} €", amount.round_dp(2))
}
