//! Role-scoped transition table.
//!
//! One static table keyed by (role, current status) lists the statuses an
//! actor may request next, together with how the action is presented. The
//! backend remains the authority; this table only decides which actions are
//! offered and which requests are refused locally.

use fooddash_types::{OrderStatus, Role};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Visual weight of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
	Primary,
	Success,
	Danger,
	Secondary,
}

/// A permitted next status and its presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
	pub target: OrderStatus,
	pub label: &'static str,
	pub icon: &'static str,
	pub style: ButtonStyle,
}

impl Transition {
	fn new(target: OrderStatus, label: &'static str, icon: &'static str, style: ButtonStyle) -> Self {
		Self {
			target,
			label,
			icon,
			style,
		}
	}
}

/// Courier claim of a `confirmed` order from the available orders board.
///
/// Kept out of [`TRANSITIONS`]: the per-order action list of a courier on a
/// `confirmed` order is empty, and a claim is only offered by the board when
/// the courier holds no active delivery.
pub static CLAIM: Lazy<Transition> = Lazy::new(|| {
	Transition::new(
		OrderStatus::WaitingForPickup,
		"Accepter la commande",
		"bike",
		ButtonStyle::Primary,
	)
});

fn customer_cancel() -> Transition {
	Transition::new(
		OrderStatus::Cancelled,
		"Annuler la commande",
		"x",
		ButtonStyle::Danger,
	)
}

// Static transition table - (role, status) maps to the allowed next statuses,
// in display order
static TRANSITIONS: Lazy<HashMap<(Role, OrderStatus), Vec<Transition>>> = Lazy::new(|| {
	let mut m = HashMap::new();

	m.insert(
		(Role::Restaurant, OrderStatus::Pending),
		vec![
			Transition::new(OrderStatus::Confirmed, "Accepter", "check", ButtonStyle::Success),
			Transition::new(OrderStatus::Cancelled, "Refuser", "x", ButtonStyle::Danger),
		],
	);
	for status in [OrderStatus::Confirmed, OrderStatus::WaitingForPickup] {
		m.insert(
			(Role::Restaurant, status),
			vec![Transition::new(
				OrderStatus::Preparing,
				"Commencer la préparation",
				"chef-hat",
				ButtonStyle::Primary,
			)],
		);
	}
	m.insert(
		(Role::Restaurant, OrderStatus::Preparing),
		vec![Transition::new(
			OrderStatus::Delivering,
			"Envoyer en livraison",
			"truck",
			ButtonStyle::Primary,
		)],
	);
	m.insert(
		(Role::Restaurant, OrderStatus::Delivering),
		vec![Transition::new(
			OrderStatus::Completed,
			"Marquer comme terminée",
			"check-circle",
			ButtonStyle::Success,
		)],
	);

	m.insert(
		(Role::Courier, OrderStatus::WaitingForPickup),
		vec![
			Transition::new(
				OrderStatus::ProductPickedUp,
				"Commande récupérée",
				"package",
				ButtonStyle::Primary,
			),
			Transition::new(
				OrderStatus::Cancelled,
				"Annuler la livraison",
				"x",
				ButtonStyle::Danger,
			),
		],
	);
	// No cancel after pickup
	m.insert(
		(Role::Courier, OrderStatus::ProductPickedUp),
		vec![Transition::new(
			OrderStatus::ConfirmedByDelivery,
			"Confirmer la livraison",
			"check",
			ButtonStyle::Success,
		)],
	);

	for status in OrderStatus::all().filter(|s| !s.is_terminal()) {
		let actions = if status == OrderStatus::ConfirmedByDelivery {
			vec![
				Transition::new(
					OrderStatus::ConfirmedByClient,
					"Confirmer réception",
					"check-circle",
					ButtonStyle::Success,
				),
				customer_cancel(),
			]
		} else {
			vec![customer_cancel()]
		};
		m.insert((Role::Customer, status), actions);
	}

	m
});

/// Transitions offered to `role` on an order in `status`, in display order.
///
/// Terminal and unknown statuses yield an empty slice, as does every status
/// for admins.
pub fn transitions_for(status: &OrderStatus, role: Role) -> &'static [Transition] {
	TRANSITIONS
		.get(&(role, status.clone()))
		.map(Vec::as_slice)
		.unwrap_or(&[])
}

/// Statuses `role` may request next from `status`.
pub fn available_transitions(status: &OrderStatus, role: Role) -> Vec<OrderStatus> {
	transitions_for(status, role)
		.iter()
		.map(|t| t.target.clone())
		.collect()
}

/// True when the table allows `role` to move an order from `from` to `to`.
pub fn is_permitted(from: &OrderStatus, role: Role, to: &OrderStatus) -> bool {
	transitions_for(from, role).iter().any(|t| &t.target == to)
}

/// True when a courier may claim an order in `status`.
pub fn can_claim(status: &OrderStatus, holds_active_delivery: bool) -> bool {
	*status == OrderStatus::Confirmed && !holds_active_delivery
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_courier_waiting_for_pickup() {
		assert_eq!(
			available_transitions(&OrderStatus::WaitingForPickup, Role::Courier),
			vec![OrderStatus::ProductPickedUp, OrderStatus::Cancelled]
		);
	}

	#[test]
	fn test_courier_cannot_cancel_after_pickup() {
		assert_eq!(
			available_transitions(&OrderStatus::ProductPickedUp, Role::Courier),
			vec![OrderStatus::ConfirmedByDelivery]
		);
	}

	#[test]
	fn test_courier_has_nothing_elsewhere() {
		for status in [
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			OrderStatus::ConfirmedByDelivery,
			OrderStatus::ConfirmedByClient,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		] {
			assert!(
				available_transitions(&status, Role::Courier).is_empty(),
				"courier should have no actions on {}",
				status
			);
		}
	}

	#[test]
	fn test_restaurant_pending_accept_or_refuse() {
		let actions = transitions_for(&OrderStatus::Pending, Role::Restaurant);
		let labels: Vec<_> = actions.iter().map(|t| (t.target.clone(), t.label)).collect();
		assert_eq!(
			labels,
			vec![
				(OrderStatus::Confirmed, "Accepter"),
				(OrderStatus::Cancelled, "Refuser")
			]
		);
	}

	#[test]
	fn test_restaurant_legacy_branch() {
		assert_eq!(
			available_transitions(&OrderStatus::Confirmed, Role::Restaurant),
			vec![OrderStatus::Preparing]
		);
		assert_eq!(
			available_transitions(&OrderStatus::WaitingForPickup, Role::Restaurant),
			vec![OrderStatus::Preparing]
		);
		assert_eq!(
			available_transitions(&OrderStatus::Preparing, Role::Restaurant),
			vec![OrderStatus::Delivering]
		);
		assert_eq!(
			available_transitions(&OrderStatus::Delivering, Role::Restaurant),
			vec![OrderStatus::Completed]
		);
		assert!(available_transitions(&OrderStatus::ProductPickedUp, Role::Restaurant).is_empty());
	}

	#[test]
	fn test_customer_confirms_reception() {
		let actions = transitions_for(&OrderStatus::ConfirmedByDelivery, Role::Customer);
		assert!(actions
			.iter()
			.any(|t| t.target == OrderStatus::ConfirmedByClient && t.label == "Confirmer réception"));
		assert!(actions.iter().any(|t| t.target == OrderStatus::Cancelled));
	}

	#[test]
	fn test_customer_cancel_on_non_terminal() {
		for status in OrderStatus::all() {
			let can_cancel = is_permitted(&status, Role::Customer, &OrderStatus::Cancelled);
			assert_eq!(can_cancel, !status.is_terminal(), "status {}", status);
		}
	}

	#[test]
	fn test_terminal_unknown_and_admin_are_empty() {
		let unknown = OrderStatus::Other("on hold".into());
		for role in Role::all() {
			assert!(available_transitions(&OrderStatus::Completed, role).is_empty());
			assert!(available_transitions(&OrderStatus::Cancelled, role).is_empty());
			assert!(available_transitions(&unknown, role).is_empty());
		}
		for status in OrderStatus::all() {
			assert!(available_transitions(&status, Role::Admin).is_empty());
		}
	}

	#[test]
	fn test_is_permitted_rejects_skips() {
		assert!(!is_permitted(
			&OrderStatus::Pending,
			Role::Restaurant,
			&OrderStatus::Completed
		));
		assert!(!is_permitted(
			&OrderStatus::Confirmed,
			Role::Courier,
			&OrderStatus::WaitingForPickup
		));
	}

	#[test]
	fn test_claim_rule() {
		assert!(can_claim(&OrderStatus::Confirmed, false));
		assert!(!can_claim(&OrderStatus::Confirmed, true));
		assert!(!can_claim(&OrderStatus::Pending, false));
		assert_eq!(CLAIM.target, OrderStatus::WaitingForPickup);
	}
}
