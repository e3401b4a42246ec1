//! Client storage for the fooddash client.
//!
//! This is the persisted key-value store a browser client would keep in
//! local storage: the bearer token and the shopping cart live here. Keys are
//! flat strings; values are raw bytes at the backend level and JSON or plain
//! UTF-8 at the service level.

use async_trait::async_trait;
use fooddash_types::AccessToken;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested key is not present.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs when the backend configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key. Deleting a missing
	/// key is not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Type alias for storage factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Get all registered storage implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::NAME, file::create_storage as StorageFactory),
		(memory::NAME, memory::create_storage as StorageFactory),
	]
}

/// High-level storage service with typed and string accessors.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a value serialized as JSON.
	pub async fn store<T: Serialize>(&self, key: &str, data: &T) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(key, bytes).await
	}

	/// Retrieves and deserializes a JSON value.
	pub async fn retrieve<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Like [`retrieve`](Self::retrieve) but maps a missing key to `None`.
	pub async fn retrieve_optional<T: DeserializeOwned>(
		&self,
		key: &str,
	) -> Result<Option<T>, StorageError> {
		match self.retrieve(key).await {
			Ok(value) => Ok(Some(value)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Stores a plain string, the way browser local storage holds values.
	pub async fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.backend.set_bytes(key, value.as_bytes().to_vec()).await
	}

	/// Reads a plain string. A missing key yields `None`.
	pub async fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
		match self.backend.get_bytes(key).await {
			Ok(bytes) => String::from_utf8(bytes)
				.map(Some)
				.map_err(|e| StorageError::Serialization(e.to_string())),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Reads the bearer token stored under `key`.
	///
	/// A missing or unreadable token falls back to the empty token; the
	/// request goes out anyway and the backend rejects it if needed.
	pub async fn access_token(&self, key: &str) -> AccessToken {
		match self.get_string(key).await {
			Ok(Some(token)) => AccessToken::new(token),
			Ok(None) => AccessToken::empty(),
			Err(e) => {
				tracing::warn!(key, error = %e, "Could not read access token, sending empty token");
				AccessToken::empty()
			},
		}
	}

	pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
		self.backend.delete(key).await
	}

	pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		self.backend.exists(key).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;

	#[tokio::test]
	async fn test_typed_round_trip() {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		service.store("cart", &vec![1u32, 2, 3]).await.unwrap();
		let back: Vec<u32> = service.retrieve("cart").await.unwrap();
		assert_eq!(back, vec![1, 2, 3]);
	}

	#[tokio::test]
	async fn test_retrieve_optional_missing() {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		let missing: Option<Vec<u32>> = service.retrieve_optional("cart").await.unwrap();
		assert!(missing.is_none());
	}

	#[tokio::test]
	async fn test_access_token_falls_back_to_empty() {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		assert!(service.access_token("accessToken").await.is_empty());

		service.set_string("accessToken", "abc").await.unwrap();
		let token = service.access_token("accessToken").await;
		assert_eq!(token.expose(), "abc");

		service.remove("accessToken").await.unwrap();
		assert!(service.access_token("accessToken").await.is_empty());
	}

	#[tokio::test]
	async fn test_corrupt_json_is_serialization_error() {
		let service = StorageService::new(Box::new(MemoryStorage::new()));
		service.set_string("cart", "not json").await.unwrap();
		let result: Result<Vec<u32>, _> = service.retrieve("cart").await;
		assert!(matches!(result, Err(StorageError::Serialization(_))));
	}

	#[test]
	fn test_all_implementations_registered() {
		let names: Vec<&str> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["file", "memory"]);
	}
}
