//! In-memory storage backend.
//!
//! Nothing survives a restart. Used by tests and by configurations that do
//! not need a persisted token or cart.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry name of this backend.
pub const NAME: &str = "memory";

/// In-memory storage implementation.
#[derive(Clone, Default)]
pub struct MemoryStorage {
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}
}

/// Factory function to create a memory storage backend.
///
/// Takes no configuration.
pub fn create_storage(_config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	Ok(Box::new(MemoryStorage::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		storage
			.set_bytes("accessToken", b"token".to_vec())
			.await
			.unwrap();
		assert_eq!(storage.get_bytes("accessToken").await.unwrap(), b"token");
		assert!(storage.exists("accessToken").await.unwrap());

		storage.delete("accessToken").await.unwrap();
		assert!(!storage.exists("accessToken").await.unwrap());
		assert!(matches!(
			storage.get_bytes("accessToken").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_clones_share_state() {
		let storage = MemoryStorage::new();
		let other = storage.clone();
		storage.set_bytes("cart", b"[]".to_vec()).await.unwrap();
		assert!(other.exists("cart").await.unwrap());
	}

	#[tokio::test]
	async fn test_delete_missing_is_ok() {
		let storage = MemoryStorage::new();
		assert!(storage.delete("nothing").await.is_ok());
	}
}
