//! Configuration module for the fooddash client.
//!
//! Configuration is read from TOML. Values may reference environment
//! variables as `${VAR}` or `${VAR:-default}`, and a file may pull other
//! files in with `include = ["a.toml", "b.toml"]`. Each top-level section
//! must be defined exactly once across all included files.

mod loader;

#[cfg(any(test, feature = "testing"))]
pub mod builders;

use fooddash_types::Role;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default Display dumps the whole input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this client and the actor it acts for.
	pub client: ClientConfig,
	/// Marketplace backend.
	pub api: ApiConfig,
	/// Where the bearer token is kept.
	#[serde(default)]
	pub auth: AuthConfig,
	/// Client storage backends.
	pub storage: StorageConfig,
	/// Refresh timer of the tracking views.
	#[serde(default)]
	pub polling: PollingConfig,
	/// Lifetime of transient notifications.
	#[serde(default)]
	pub notifications: NotificationConfig,
}

/// Identity of this client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Name used in log lines.
	pub id: String,
	/// Actor the client acts for.
	#[serde(default = "default_role")]
	pub role: Role,
	/// Backend user id of the actor. Required for couriers, whose claims and
	/// cancellations carry it.
	pub user_id: Option<u64>,
}

fn default_role() -> Role {
	Role::Customer
}

/// Marketplace backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Base URL the REST paths are appended to, e.g. `http://localhost:5000/api`.
	pub base_url: String,
	/// Per-request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Backend implementation to build.
	#[serde(default = "default_api_implementation")]
	pub implementation: String,
}

fn default_api_timeout() -> u64 {
	30
}

fn default_api_implementation() -> String {
	"http".to_string()
}

/// Bearer token settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
	/// Client storage key holding the token.
	#[serde(default = "default_token_key")]
	pub token_key: String,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			token_key: default_token_key(),
		}
	}
}

fn default_token_key() -> String {
	"accessToken".to_string()
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Refresh timer settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
	/// Seconds between two background re-fetches.
	#[serde(default = "default_polling_interval")]
	pub interval_seconds: u64,
}

impl Default for PollingConfig {
	fn default() -> Self {
		Self {
			interval_seconds: default_polling_interval(),
		}
	}
}

impl PollingConfig {
	pub fn interval(&self) -> Duration {
		Duration::from_secs(self.interval_seconds)
	}
}

fn default_polling_interval() -> u64 {
	30
}

/// Notification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
	/// Seconds a notification stays visible unless dismissed earlier.
	#[serde(default = "default_notification_ttl")]
	pub ttl_seconds: u64,
}

impl Default for NotificationConfig {
	fn default() -> Self {
		Self {
			ttl_seconds: default_notification_ttl(),
		}
	}
}

impl NotificationConfig {
	pub fn ttl(&self) -> Duration {
		Duration::from_secs(self.ttl_seconds)
	}
}

fn default_notification_ttl() -> u64 {
	5
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable and
/// `${VAR_NAME:-default}` with the default when the variable is unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| var_name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(var_name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		let mut loader = loader::ConfigLoader::new(base_dir);
		loader.load_config(file_name).await
	}

	/// Per-request timeout of the backend client.
	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.api.timeout_seconds)
	}

	/// Validates the configuration.
	///
	/// - client id is not empty; couriers have a `user_id`
	/// - the API base URL is an http(s) URL and the timeout is 1..=300 s
	/// - the token key is not empty
	/// - the primary storage is one of the configured implementations
	/// - the polling interval is 1..=3600 s
	fn validate(&self) -> Result<(), ConfigError> {
		if self.client.id.trim().is_empty() {
			return Err(ConfigError::Validation("Client ID cannot be empty".into()));
		}
		if self.client.role == Role::Courier && self.client.user_id.is_none() {
			return Err(ConfigError::Validation(
				"client.user_id is required when role is courier".into(),
			));
		}

		let base_url = self.api.base_url.trim();
		if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
			return Err(ConfigError::Validation(format!(
				"api.base_url must start with http:// or https://, got '{}'",
				self.api.base_url
			)));
		}
		if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 300 {
			return Err(ConfigError::Validation(
				"api.timeout_seconds must be between 1 and 300".into(),
			));
		}

		if self.api.implementation.trim().is_empty() {
			return Err(ConfigError::Validation(
				"api.implementation cannot be empty".into(),
			));
		}

		if self.auth.token_key.trim().is_empty() {
			return Err(ConfigError::Validation(
				"auth.token_key cannot be empty".into(),
			));
		}

		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		if self.polling.interval_seconds == 0 || self.polling.interval_seconds > 3600 {
			return Err(ConfigError::Validation(
				"polling.interval_seconds must be between 1 and 3600".into(),
			));
		}

		Ok(())
	}
}

/// Parses and validates a configuration from a TOML string, after
/// environment variable resolution.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[client]
id = "web"

[api]
base_url = "http://localhost:5000/api"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_minimal_config_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.client.role, Role::Customer);
		assert_eq!(config.api.timeout_seconds, 30);
		assert_eq!(config.api.implementation, "http");
		assert_eq!(config.auth.token_key, "accessToken");
		assert_eq!(config.polling.interval(), Duration::from_secs(30));
		assert_eq!(config.notifications.ttl(), Duration::from_secs(5));
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("FOODDASH_TEST_HOST", "api.local");
		std::env::set_var("FOODDASH_TEST_PORT", "8080");

		let input = "url = \"http://${FOODDASH_TEST_HOST}:${FOODDASH_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://api.local:8080\"");

		std::env::remove_var("FOODDASH_TEST_HOST");
		std::env::remove_var("FOODDASH_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${FOODDASH_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${FOODDASH_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("FOODDASH_MISSING_VAR"));
	}

	#[test]
	fn test_courier_requires_user_id() {
		let config = MINIMAL.replace("id = \"web\"", "id = \"web\"\nrole = \"courier\"");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("user_id"));

		let config = MINIMAL.replace(
			"id = \"web\"",
			"id = \"web\"\nrole = \"courier\"\nuser_id = 12",
		);
		let parsed: Config = config.parse().unwrap();
		assert_eq!(parsed.client.user_id, Some(12));
	}

	#[test]
	fn test_rejects_bad_base_url() {
		let config = MINIMAL.replace("http://localhost:5000/api", "localhost:5000");
		assert!(matches!(
			config.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_rejects_unknown_primary_storage() {
		let config = MINIMAL.replace("primary = \"memory\"", "primary = \"file\"");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Primary storage 'file'"));
	}

	#[test]
	fn test_rejects_zero_polling_interval() {
		let config = format!("{}\n[polling]\ninterval_seconds = 0\n", MINIMAL);
		assert!(config.parse::<Config>().is_err());
	}

	#[test]
	fn test_parse_error_is_short() {
		let err = "[client\nid = 1".parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}
}
