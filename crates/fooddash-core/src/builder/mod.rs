//! Builder pattern for constructing the client.
//!
//! Storage and backend implementations are picked by name from factory maps,
//! so a binary decides which implementations exist and the configuration
//! decides which one is used.

use crate::engine::{event_bus::EventBus, Client};
use fooddash_api::{ApiError, BackendInterface, BackendService};
use fooddash_config::Config;
use fooddash_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during client construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions the client can be built from, keyed by implementation
/// name.
pub struct ClientFactories<SF, BF> {
	pub storage_factories: HashMap<String, SF>,
	pub backend_factories: HashMap<String, BF>,
}

/// Builder for constructing a [`Client`] with pluggable implementations.
pub struct ClientBuilder {
	config: Config,
	backend: Option<Box<dyn BackendInterface>>,
}

impl ClientBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			backend: None,
		}
	}

	/// Uses `backend` instead of building one from the backend factories.
	pub fn with_backend(mut self, backend: Box<dyn BackendInterface>) -> Self {
		self.backend = Some(backend);
		self
	}

	pub async fn build<SF, BF>(self, factories: ClientFactories<SF, BF>) -> Result<Client, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		BF: Fn(&Config, Arc<StorageService>) -> Result<Box<dyn BackendInterface>, ApiError>,
	{
		// Only the primary storage is built; the others stay idle
		let primary = &self.config.storage.primary;
		let storage_config = self.config.storage.implementations.get(primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' has no configuration",
				primary
			))
		})?;
		let storage_factory = factories.storage_factories.get(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!("storage implementation '{}'", primary))
		})?;
		let storage_backend = match storage_factory(storage_config) {
			Ok(implementation) => {
				tracing::info!(component = "storage", implementation = %primary, "Loaded");
				implementation
			},
			Err(e) => {
				tracing::error!(
					component = "storage",
					implementation = %primary,
					error = %e,
					"Failed to create storage implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create storage implementation '{}': {}",
					primary, e
				)));
			},
		};
		let storage = Arc::new(StorageService::new(storage_backend));

		let backend = match self.backend {
			Some(backend) => backend,
			None => {
				let name = &self.config.api.implementation;
				let factory = factories.backend_factories.get(name).ok_or_else(|| {
					BuilderError::MissingComponent(format!("backend implementation '{}'", name))
				})?;
				match factory(&self.config, storage.clone()) {
					Ok(implementation) => {
						tracing::info!(
							component = "backend",
							implementation = %name,
							base_url = %self.config.api.base_url,
							"Loaded"
						);
						implementation
					},
					Err(e) => {
						tracing::error!(
							component = "backend",
							implementation = %name,
							error = %e,
							"Failed to create backend implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create backend implementation '{}': {}",
							name, e
						)));
					},
				}
			},
		};
		let backend = Arc::new(BackendService::new(backend));

		Ok(Client::new(self.config, storage, backend, EventBus::default()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fooddash_api::{BackendFactory, MockBackendInterface};
	use fooddash_config::builders::config::ConfigBuilder;
	use fooddash_storage::StorageFactory;

	fn factories(
		backends: Vec<(&str, BackendFactory)>,
	) -> ClientFactories<StorageFactory, BackendFactory> {
		ClientFactories {
			storage_factories: fooddash_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			backend_factories: backends
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	fn mock_backend(
		_config: &Config,
		_storage: Arc<StorageService>,
	) -> Result<Box<dyn BackendInterface>, ApiError> {
		Ok(Box::new(MockBackendInterface::new()))
	}

	#[tokio::test]
	async fn test_builds_from_factories() {
		let client = ClientBuilder::new(ConfigBuilder::new().build())
			.build(factories(vec![("http", mock_backend as BackendFactory)]))
			.await
			.unwrap();
		assert_eq!(client.config().storage.primary, "memory");
	}

	#[tokio::test]
	async fn test_unknown_backend_is_missing_component() {
		let result = ClientBuilder::new(ConfigBuilder::new().build())
			.build(factories(Vec::new()))
			.await;
		assert!(matches!(result, Err(BuilderError::MissingComponent(_))));
	}

	#[tokio::test]
	async fn test_explicit_backend_skips_factories() {
		let result = ClientBuilder::new(ConfigBuilder::new().build())
			.with_backend(Box::new(MockBackendInterface::new()))
			.build(factories(Vec::new()))
			.await;
		assert!(result.is_ok());
	}

	#[tokio::test]
	async fn test_unconfigured_primary_storage() {
		let mut config = ConfigBuilder::new().build();
		config.storage.primary = "redis".into();
		let result = ClientBuilder::new(config)
			.build(factories(vec![("http", mock_backend as BackendFactory)]))
			.await;
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}
}
