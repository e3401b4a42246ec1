//! Subcommands of the `fooddash` binary and their text output.

use clap::Subcommand;
use fooddash_api::ApiError;
use fooddash_core::stepper::{StepState, Stepper};
use fooddash_core::{ActionButton, Client, DispatchError};
use fooddash_types::{format_price, truncate, CartItem, Order, OrderStatus, Role};
use rust_decimal::Decimal;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Show an order, its progress and the actions open to the configured role
	Track {
		order_id: u64,
		/// Keep polling and print every change until interrupted
		#[arg(short, long)]
		watch: bool,
	},
	/// List the actions the configured role may take on an order
	Actions { order_id: u64 },
	/// Request a status change, e.g. `transition 12 "waiting for pickup"`
	Transition { order_id: u64, status: String },
	/// List orders, optionally of one restaurant or in one status
	Orders {
		#[arg(long)]
		restaurant: Option<u64>,
		#[arg(long)]
		status: Option<String>,
	},
	/// Show the courier's current delivery, or move it to another status
	Delivery {
		#[arg(long)]
		set: Option<String>,
	},
	/// List the orders waiting for a courier, or claim one
	Accept { order_id: Option<u64> },
	/// Manage the bearer token sent to the backend
	Token {
		#[command(subcommand)]
		action: TokenCommand,
	},
	/// Manage the cart
	Cart {
		#[command(subcommand)]
		action: CartCommand,
	},
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
	Set { token: String },
	Clear,
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
	/// Add one unit of an item
	Add {
		item_id: u64,
		#[arg(long)]
		name: String,
		#[arg(long)]
		price: Decimal,
		#[arg(long)]
		restaurant: u64,
	},
	/// Remove one unit of an item, or the whole line with --all
	Remove {
		item_id: u64,
		#[arg(long)]
		all: bool,
	},
	Show,
	Clear,
}

pub async fn run(client: &Client, command: Command) -> CliResult {
	match command {
		Command::Track { order_id, watch } => track(client, order_id, watch).await,
		Command::Actions { order_id } => actions(client, order_id).await,
		Command::Transition { order_id, status } => {
			transition(client, order_id, OrderStatus::from(status.as_str())).await
		},
		Command::Orders { restaurant, status } => orders(client, restaurant, status).await,
		Command::Delivery { set } => delivery(client, set).await,
		Command::Accept { order_id } => accept(client, order_id).await,
		Command::Token { action } => token(client, action).await,
		Command::Cart { action } => cart(client, action).await,
	}
}

async fn track(client: &Client, order_id: u64, watch: bool) -> CliResult {
	let mut view = client.order_tracking(order_id);
	if !watch {
		view.refresh().await.map_err(backend_error)?;
		if let Some(order) = view.order() {
			println!("{}", format_order(&order));
			if let Some(stepper) = view.stepper() {
				print!("{}", format_stepper(&stepper));
			}
			print!("{}", format_buttons(&view.actions().await));
		}
		return Ok(());
	}

	let mut rx = view.subscribe();
	view.mount();
	loop {
		tokio::select! {
			changed = rx.changed() => {
				if changed.is_err() {
					break;
				}
				let latest = rx.borrow_and_update().clone();
				if let Some(order) = latest {
					println!("{}", format_order(&order));
					if let Some(stepper) = view.stepper() {
						print!("{}", format_stepper(&stepper));
					}
				}
			}
			_ = tokio::signal::ctrl_c() => break,
		}
	}
	view.unmount();
	Ok(())
}

async fn actions(client: &Client, order_id: u64) -> CliResult {
	let view = client.order_tracking(order_id);
	view.refresh().await.map_err(backend_error)?;
	print!("{}", format_buttons(&view.actions().await));
	Ok(())
}

async fn transition(client: &Client, order_id: u64, target: OrderStatus) -> CliResult {
	// Couriers act through their delivery so cancellations carry their id
	if client.role() == Role::Courier {
		let view = client.delivery_tracking()?;
		view.refresh().await.map_err(backend_error)?;
		let delivered_order = view.delivery().and_then(|d| d.resolved.order_id);
		if delivered_order != Some(order_id) {
			return Err(format!("order {} is not your current delivery", order_id).into());
		}
		view.perform(target).await.map_err(dispatch_error)?;
		if let Some(snapshot) = view.delivery() {
			if let Some(status) = snapshot.resolved.status {
				println!("#{}  {}", order_id, status.label());
			}
		}
		return Ok(());
	}

	let view = client.order_tracking(order_id);
	view.refresh().await.map_err(backend_error)?;
	view.perform(target).await.map_err(dispatch_error)?;
	if let Some(order) = view.order() {
		println!("{}", format_order(&order));
	}
	Ok(())
}

async fn orders(client: &Client, restaurant: Option<u64>, status: Option<String>) -> CliResult {
	let board = client.restaurant_board(restaurant);
	board.refresh().await.map_err(backend_error)?;

	let orders = match status {
		Some(status) => board.orders_with_status(&OrderStatus::from(status.as_str())),
		None => board.orders(),
	};
	if orders.is_empty() {
		println!("Aucune commande");
	}
	for order in &orders {
		println!("{}", format_order(order));
	}
	Ok(())
}

async fn delivery(client: &Client, set: Option<String>) -> CliResult {
	let view = client.delivery_tracking()?;
	view.refresh().await.map_err(backend_error)?;

	if let Some(target) = set {
		view.perform(OrderStatus::from(target.as_str()))
			.await
			.map_err(dispatch_error)?;
	}

	let Some(snapshot) = view.delivery() else {
		println!("Aucune livraison en cours");
		return Ok(());
	};
	let resolved = &snapshot.resolved;
	println!(
		"Livraison #{}  commande {}  {}",
		snapshot.delivery.id,
		resolved
			.order_id
			.map(|id| format!("#{}", id))
			.unwrap_or_else(|| "?".to_string()),
		resolved.status.as_ref().map(|s| s.label()).unwrap_or("")
	);
	if let Some(address) = &resolved.address {
		println!("  {}", truncate(address, 60));
	}
	if let Some(stepper) = view.stepper() {
		print!("{}", format_stepper(&stepper));
	}
	print!("{}", format_buttons(&view.actions().await));
	Ok(())
}

async fn accept(client: &Client, order_id: Option<u64>) -> CliResult {
	let board = client.courier_board()?;
	board.refresh().await.map_err(backend_error)?;

	let Some(order_id) = order_id else {
		if !board.can_accept() {
			println!("Livraison en cours : terminez-la avant d'en accepter une autre");
		}
		let available = board.available();
		if available.is_empty() {
			println!("Aucune commande disponible");
		}
		for order in &available {
			println!("{}", format_order(order));
		}
		return Ok(());
	};

	board.accept(order_id).await.map_err(dispatch_error)?;
	println!("Commande #{} acceptée", order_id);
	Ok(())
}

async fn token(client: &Client, action: TokenCommand) -> CliResult {
	match action {
		TokenCommand::Set { token } => client.set_access_token(&token).await?,
		TokenCommand::Clear => client.clear_access_token().await?,
	}
	Ok(())
}

async fn cart(client: &Client, action: CartCommand) -> CliResult {
	let cart = client.cart();
	let lines = match action {
		CartCommand::Add {
			item_id,
			name,
			price,
			restaurant,
		} => cart.add(CartItem::new(item_id, name, price, restaurant)).await?,
		CartCommand::Remove { item_id, all: true } => cart.remove(item_id).await?,
		CartCommand::Remove { item_id, all: false } => cart.decrement(item_id).await?,
		CartCommand::Show => cart.snapshot().await,
		CartCommand::Clear => cart.clear().await?,
	};

	print!("{}", format_cart(&lines));
	Ok(())
}

fn backend_error(e: ApiError) -> Box<dyn std::error::Error> {
	tracing::debug!(error = %e, "Backend request failed");
	e.user_message().into()
}

fn dispatch_error(e: DispatchError) -> Box<dyn std::error::Error> {
	match e {
		DispatchError::Backend(e) => backend_error(e),
		other => Box::new(other),
	}
}

pub(crate) fn format_order(order: &Order) -> String {
	let mut line = format!(
		"#{}  {}  {}",
		order.id,
		order.status.label(),
		format_price(order.total_price)
	);
	if !order.delivery_address.is_empty() {
		line.push_str("  ");
		line.push_str(&truncate(&order.delivery_address, 40));
	}
	line
}

pub(crate) fn format_stepper(stepper: &Stepper) -> String {
	let mut out = String::new();
	for step in &stepper.steps {
		let mark = match step.state() {
			StepState::Completed => "[x]",
			StepState::Current => "[>]",
			StepState::Pending => "[ ]",
			StepState::Cancelled => "[-]",
		};
		out.push_str(&format!("  {} {}\n", mark, step.title));
	}
	out.push_str(&format!("  {}%\n", stepper.progress_percent));
	out
}

pub(crate) fn format_buttons(buttons: &[ActionButton]) -> String {
	buttons
		.iter()
		.map(|b| {
			let suffix = if b.disabled { " (en cours)" } else { "" };
			format!("  * {} -> {}{}\n", b.label, b.request_status, suffix)
		})
		.collect()
}

pub(crate) fn format_cart(lines: &[CartItem]) -> String {
	if lines.is_empty() {
		return "Panier vide\n".to_string();
	}
	let mut out = String::new();
	let mut total = Decimal::ZERO;
	for line in lines {
		total += line.line_total();
		out.push_str(&format!(
			"  {} x{}  {}\n",
			line.name,
			line.quantity,
			format_price(line.line_total())
		));
	}
	out.push_str(&format!("Total  {}\n", format_price(total)));
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use fooddash_core::stepper;
	use fooddash_core::transitions::ButtonStyle;

	fn order(status: &str) -> Order {
		serde_json::from_value(serde_json::json!({
			"id": 12,
			"status": status,
			"total_price": "24.9",
			"delivery_address": "12 rue des Lilas"
		}))
		.unwrap()
	}

	#[test]
	fn test_format_order() {
		let line = format_order(&order("pending"));
		assert!(line.starts_with("#12  En attente"));
		assert!(line.contains("24.90 €"));
		assert!(line.ends_with("12 rue des Lilas"));
	}

	#[test]
	fn test_format_stepper_marks() {
		let out = format_stepper(&stepper::render(&OrderStatus::WaitingForPickup));
		let lines: Vec<_> = out.lines().collect();
		assert_eq!(lines[0], "  [x] En attente");
		assert_eq!(lines[2], "  [>] En attente de récupération");
		assert_eq!(lines[3], "  [ ] Commande récupérée");

		let cancelled = format_stepper(&stepper::render(&OrderStatus::Cancelled));
		assert!(cancelled.starts_with("  [-] Annulée"));
		assert!(cancelled.ends_with("100%\n"));
	}

	#[test]
	fn test_format_buttons() {
		let buttons = vec![ActionButton {
			label: "Accepter".into(),
			icon: "check",
			style: ButtonStyle::Success,
			request_status: OrderStatus::Confirmed,
			disabled: true,
		}];
		assert_eq!(format_buttons(&buttons), "  * Accepter -> confirmed (en cours)\n");
	}

	#[test]
	fn test_format_cart() {
		assert_eq!(format_cart(&[]), "Panier vide\n");
		let mut line = CartItem::new(1, "Bo bun", Decimal::new(1100, 2), 3);
		line.quantity = 2;
		let out = format_cart(&[line]);
		assert!(out.contains("Bo bun x2  22.00 €"));
		assert!(out.ends_with("Total  22.00 €\n"));
	}
}
