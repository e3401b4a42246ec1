//! Fluent construction of [`Config`] values without a TOML file.

use crate::{
	ApiConfig, AuthConfig, ClientConfig, Config, NotificationConfig, PollingConfig, StorageConfig,
};
use fooddash_types::Role;
use std::collections::HashMap;

/// Builds a valid in-memory configuration with overridable fields.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	client_id: String,
	role: Role,
	user_id: Option<u64>,
	base_url: String,
	timeout_seconds: u64,
	token_key: String,
	polling_interval_seconds: u64,
	notification_ttl_seconds: u64,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	pub fn new() -> Self {
		Self {
			client_id: "test-client".to_string(),
			role: Role::Customer,
			user_id: None,
			base_url: "http://127.0.0.1:5000".to_string(),
			timeout_seconds: 5,
			token_key: "accessToken".to_string(),
			polling_interval_seconds: 30,
			notification_ttl_seconds: 5,
		}
	}

	pub fn role(mut self, role: Role) -> Self {
		self.role = role;
		self
	}

	pub fn user_id(mut self, user_id: u64) -> Self {
		self.user_id = Some(user_id);
		self
	}

	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn token_key(mut self, key: impl Into<String>) -> Self {
		self.token_key = key.into();
		self
	}

	pub fn polling_interval_seconds(mut self, seconds: u64) -> Self {
		self.polling_interval_seconds = seconds;
		self
	}

	pub fn notification_ttl_seconds(mut self, seconds: u64) -> Self {
		self.notification_ttl_seconds = seconds;
		self
	}

	pub fn build(self) -> Config {
		let mut implementations = HashMap::new();
		implementations.insert(
			"memory".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);

		Config {
			client: ClientConfig {
				id: self.client_id,
				role: self.role,
				user_id: self.user_id,
			},
			api: ApiConfig {
				base_url: self.base_url,
				timeout_seconds: self.timeout_seconds,
				implementation: "http".to_string(),
			},
			auth: AuthConfig {
				token_key: self.token_key,
			},
			storage: StorageConfig {
				primary: "memory".to_string(),
				implementations,
			},
			polling: PollingConfig {
				interval_seconds: self.polling_interval_seconds,
			},
			notifications: NotificationConfig {
				ttl_seconds: self.notification_ttl_seconds,
			},
		}
	}
}
