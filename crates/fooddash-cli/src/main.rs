//! Command-line front end of the fooddash client.
//!
//! Loads the configuration, builds the client with the storage and backend
//! implementations compiled into this binary, and runs one command on behalf
//! of the configured role.

use clap::Parser;
use fooddash_config::Config;
use fooddash_core::{Client, ClientBuilder, ClientFactories};
use std::path::PathBuf;

mod commands;

use commands::Command;
use fooddash_api::implementations::http::create_backend as create_http_backend;
use fooddash_storage::implementations::file::create_storage as create_file_storage;
use fooddash_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments of the fooddash client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "FOODDASH_CONFIG", default_value = "config/fooddash.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.client.id);

	let client = build_client(config).await?;
	client.initialize().await?;

	let result = commands::run(&client, args.command).await;

	client.shutdown().await?;
	result
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};

    // Variant for backend factories, which read the whole config and the token storage
    ($interface:path, $error:path, backend, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&Config, std::sync::Arc<fooddash_storage::StorageService>) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the client with every implementation this binary ships.
async fn build_client(config: Config) -> Result<Client, Box<dyn std::error::Error>> {
	let builder = ClientBuilder::new(config);

	let storage_factories = create_factory_map!(
		fooddash_storage::StorageInterface,
		fooddash_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let backend_factories = create_factory_map!(
		fooddash_api::BackendInterface,
		fooddash_api::ApiError,
		backend,
		"http" => create_http_backend,
	);

	let factories = ClientFactories {
		storage_factories,
		backend_factories,
	};

	Ok(builder.build(factories).await?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use fooddash_config::builders::config::ConfigBuilder;

	#[test]
	fn test_args_parse_subcommand() {
		let args = Args::try_parse_from(["fooddash", "-c", "local.toml", "track", "12"]).unwrap();
		assert_eq!(args.config, PathBuf::from("local.toml"));
		assert_eq!(args.log_level, "warn");
		assert!(matches!(args.command, Command::Track { order_id: 12, watch: false }));
	}

	#[test]
	fn test_args_require_subcommand() {
		assert!(Args::try_parse_from(["fooddash"]).is_err());
	}

	#[tokio::test]
	async fn test_build_client_with_shipped_factories() {
		let client = build_client(ConfigBuilder::new().build()).await.unwrap();
		assert_eq!(client.config().api.implementation, "http");
	}
}
