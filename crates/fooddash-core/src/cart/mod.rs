//! Shopping cart store.
//!
//! The store owns the cart and hands out immutable snapshots; every change
//! builds a new snapshot. When backed by client storage, each change is
//! persisted under the `cart` key.

use fooddash_storage::{StorageError, StorageService};
use fooddash_types::{CartItem, StorageKey};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type CartSnapshot = Arc<Vec<CartItem>>;

pub struct CartStore {
	storage: Option<Arc<StorageService>>,
	lines: Mutex<CartSnapshot>,
}

impl Default for CartStore {
	fn default() -> Self {
		Self::new()
	}
}

impl CartStore {
	/// A cart that lives only in memory.
	pub fn new() -> Self {
		Self {
			storage: None,
			lines: Mutex::new(Arc::new(Vec::new())),
		}
	}

	/// A cart persisted to client storage. Call [`load`](Self::load) to
	/// restore a previously saved cart.
	pub fn persistent(storage: Arc<StorageService>) -> Self {
		Self {
			storage: Some(storage),
			lines: Mutex::new(Arc::new(Vec::new())),
		}
	}

	/// Restores the saved cart. A missing cart is an empty one; lines with a
	/// zero quantity are dropped.
	pub async fn load(&self) -> Result<CartSnapshot, StorageError> {
		let Some(storage) = &self.storage else {
			return Ok(self.snapshot().await);
		};
		let saved: Vec<CartItem> = storage
			.retrieve_optional(StorageKey::Cart.as_str())
			.await?
			.unwrap_or_default();
		let saved: Vec<_> = saved.into_iter().filter(|l| l.quantity > 0).collect();

		let snapshot = Arc::new(saved);
		*self.lines.lock().await = snapshot.clone();
		tracing::debug!(lines = snapshot.len(), "Cart restored");
		Ok(snapshot)
	}

	pub async fn snapshot(&self) -> CartSnapshot {
		self.lines.lock().await.clone()
	}

	/// Adds one unit of `item`. An item already in the cart has its quantity
	/// incremented instead of getting a second line.
	pub async fn add(&self, item: CartItem) -> Result<CartSnapshot, StorageError> {
		self.update(|lines| match lines.iter_mut().find(|l| l.item_id == item.item_id) {
			Some(line) => line.quantity += 1,
			None => lines.push(CartItem { quantity: 1, ..item }),
		})
		.await
	}

	/// Removes one unit. A line reaching zero leaves the cart.
	pub async fn decrement(&self, item_id: u64) -> Result<CartSnapshot, StorageError> {
		self.update(|lines| {
			if let Some(line) = lines.iter_mut().find(|l| l.item_id == item_id) {
				line.quantity = line.quantity.saturating_sub(1);
			}
			lines.retain(|l| l.quantity > 0);
		})
		.await
	}

	/// Removes a line whatever its quantity.
	pub async fn remove(&self, item_id: u64) -> Result<CartSnapshot, StorageError> {
		self.update(|lines| lines.retain(|l| l.item_id != item_id))
			.await
	}

	pub async fn clear(&self) -> Result<CartSnapshot, StorageError> {
		self.update(Vec::clear).await
	}

	pub async fn total(&self) -> Decimal {
		self.snapshot().await.iter().map(CartItem::line_total).sum()
	}

	/// Number of units across all lines.
	pub async fn count(&self) -> u32 {
		self.snapshot().await.iter().map(|l| l.quantity).sum()
	}

	async fn update<F>(&self, change: F) -> Result<CartSnapshot, StorageError>
	where
		F: FnOnce(&mut Vec<CartItem>),
	{
		let mut guard = self.lines.lock().await;
		let mut lines = guard.as_ref().clone();
		change(&mut lines);

		if let Some(storage) = &self.storage {
			storage.store(StorageKey::Cart.as_str(), &lines).await?;
		}

		let snapshot = Arc::new(lines);
		*guard = snapshot.clone();
		Ok(snapshot)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fooddash_storage::implementations::memory::MemoryStorage;

	fn pizza() -> CartItem {
		CartItem::new(1, "Margherita", Decimal::new(1150, 2), 2)
	}

	#[tokio::test]
	async fn test_same_item_twice_increments() {
		let cart = CartStore::new();
		cart.add(pizza()).await.unwrap();
		let snapshot = cart.add(pizza()).await.unwrap();

		assert_eq!(snapshot.len(), 1);
		assert_eq!(snapshot[0].quantity, 2);
		assert_eq!(cart.total().await, Decimal::new(2300, 2));
	}

	#[tokio::test]
	async fn test_decrement_to_zero_removes() {
		let cart = CartStore::new();
		cart.add(pizza()).await.unwrap();
		let snapshot = cart.decrement(1).await.unwrap();
		assert!(snapshot.is_empty());
		assert_eq!(cart.count().await, 0);

		// Unknown items are ignored
		assert!(cart.decrement(42).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_snapshots_are_immutable() {
		let cart = CartStore::new();
		let before = cart.add(pizza()).await.unwrap();
		cart.add(CartItem::new(2, "Tiramisu", Decimal::new(600, 2), 2))
			.await
			.unwrap();

		assert_eq!(before.len(), 1);
		assert_eq!(cart.snapshot().await.len(), 2);
		assert_eq!(cart.remove(1).await.unwrap().len(), 1);
		assert!(cart.clear().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_persisted_cart_survives_reload() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));

		let cart = CartStore::persistent(storage.clone());
		cart.add(pizza()).await.unwrap();
		cart.add(pizza()).await.unwrap();

		let reopened = CartStore::persistent(storage);
		let restored = reopened.load().await.unwrap();
		assert_eq!(restored.len(), 1);
		assert_eq!(restored[0].quantity, 2);
	}

	#[tokio::test]
	async fn test_load_without_saved_cart() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let cart = CartStore::persistent(storage);
		assert!(cart.load().await.unwrap().is_empty());
		assert!(CartStore::new().load().await.unwrap().is_empty());
	}
}
