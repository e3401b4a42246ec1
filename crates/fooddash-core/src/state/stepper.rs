//! Progress stepper derived from an order status.

use fooddash_types::{OrderStatus, CANONICAL_PROGRESSION};
use serde::Serialize;

/// Display state of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
	Completed,
	Current,
	Pending,
	Cancelled,
}

/// One step of the tracking stepper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDescriptor {
	pub index: usize,
	pub status: OrderStatus,
	pub title: String,
	pub description: &'static str,
	pub completed: bool,
	/// The step the order is at. A current step is also completed.
	pub current: bool,
}

impl StepDescriptor {
	pub fn state(&self) -> StepState {
		if self.status == OrderStatus::Cancelled {
			StepState::Cancelled
		} else if self.current {
			StepState::Current
		} else if self.completed {
			StepState::Completed
		} else {
			StepState::Pending
		}
	}
}

/// Rendered stepper for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stepper {
	pub steps: Vec<StepDescriptor>,
	/// Progress in percent, 0..=100.
	pub progress_percent: u8,
}

fn description(status: &OrderStatus) -> &'static str {
	match status {
		OrderStatus::Pending => "Votre commande a été transmise au restaurant",
		OrderStatus::Confirmed => "Le restaurant a accepté votre commande",
		OrderStatus::WaitingForPickup => "Un livreur va récupérer votre commande",
		OrderStatus::ProductPickedUp => "Le livreur a récupéré votre commande",
		OrderStatus::ConfirmedByDelivery => "Le livreur indique avoir livré la commande",
		OrderStatus::ConfirmedByClient => "Vous avez confirmé la réception",
		OrderStatus::Completed => "Commande terminée",
		OrderStatus::Cancelled => "Cette commande a été annulée",
		_ => "",
	}
}

/// Renders the stepper for `status`.
///
/// `cancelled` renders a single cancelled step. Legacy and unknown statuses
/// have no position on the progression, so nothing is marked completed.
pub fn render(status: &OrderStatus) -> Stepper {
	if *status == OrderStatus::Cancelled {
		return Stepper {
			steps: vec![StepDescriptor {
				index: 0,
				status: OrderStatus::Cancelled,
				title: OrderStatus::Cancelled.label().to_string(),
				description: description(&OrderStatus::Cancelled),
				completed: false,
				current: false,
			}],
			progress_percent: 100,
		};
	}

	let position = status.progression_index();
	let steps: Vec<_> = CANONICAL_PROGRESSION
		.iter()
		.enumerate()
		.map(|(index, step)| StepDescriptor {
			index,
			status: step.clone(),
			title: step.label().to_string(),
			description: description(step),
			completed: position.is_some_and(|p| index <= p),
			current: position == Some(index),
		})
		.collect();

	Stepper {
		progress_percent: progress_percent(position, steps.len()),
		steps,
	}
}

fn progress_percent(position: Option<usize>, len: usize) -> u8 {
	match position {
		None => 0,
		Some(_) if len <= 1 => 100,
		Some(p) => ((p.min(len - 1) * 100) / (len - 1)) as u8,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn completed_indices(stepper: &Stepper) -> Vec<usize> {
		stepper
			.steps
			.iter()
			.filter(|s| s.completed)
			.map(|s| s.index)
			.collect()
	}

	#[test]
	fn test_steps_up_to_current_are_completed() {
		for (i, status) in CANONICAL_PROGRESSION.iter().enumerate() {
			let stepper = render(status);
			assert_eq!(stepper.steps.len(), CANONICAL_PROGRESSION.len());
			assert_eq!(completed_indices(&stepper), (0..=i).collect::<Vec<_>>());
			let current: Vec<_> = stepper.steps.iter().filter(|s| s.current).collect();
			assert_eq!(current.len(), 1);
			assert_eq!(current[0].index, i);
		}
	}

	#[test]
	fn test_confirmed_by_delivery() {
		let stepper = render(&OrderStatus::ConfirmedByDelivery);
		assert_eq!(completed_indices(&stepper), vec![0, 1, 2, 3, 4]);
		assert_eq!(stepper.steps[4].state(), StepState::Current);
		assert_eq!(stepper.steps[3].state(), StepState::Completed);
		assert_eq!(stepper.steps[5].state(), StepState::Pending);
		assert_eq!(stepper.steps[6].state(), StepState::Pending);
		assert_eq!(stepper.progress_percent, 66);
	}

	#[test]
	fn test_cancelled_is_single_step() {
		let stepper = render(&OrderStatus::Cancelled);
		assert_eq!(stepper.steps.len(), 1);
		assert_eq!(stepper.steps[0].state(), StepState::Cancelled);
		assert_eq!(stepper.steps[0].title, "Annulée");
		assert_eq!(stepper.progress_percent, 100);
	}

	#[test]
	fn test_legacy_and_unknown_complete_nothing() {
		for status in [OrderStatus::Preparing, OrderStatus::Other("archived".into())] {
			let stepper = render(&status);
			assert!(completed_indices(&stepper).is_empty());
			assert!(stepper.steps.iter().all(|s| s.state() == StepState::Pending));
			assert_eq!(stepper.progress_percent, 0);
		}
	}

	#[test]
	fn test_progress_bounds() {
		assert_eq!(render(&OrderStatus::Pending).progress_percent, 0);
		assert_eq!(render(&OrderStatus::Completed).progress_percent, 100);
		assert_eq!(progress_percent(Some(0), 1), 100);
		assert_eq!(progress_percent(Some(0), 0), 100);
	}

	#[test]
	fn test_titles_come_from_vocabulary() {
		let stepper = render(&OrderStatus::Pending);
		assert_eq!(stepper.steps[2].title, "En attente de récupération");
	}
}
