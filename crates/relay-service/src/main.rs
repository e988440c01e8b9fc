//! Main entry point for the game relayer service.
//!
//! This binary accepts gasless game actions over HTTP and submits them as
//! transactions signed by a single funded relayer account, one at a time and
//! in arrival order.

use clap::Parser;
use relay_config::{Config, ConfigError};
use relay_core::{BreakoutGame, RelayQueue, SubmissionExecutor};
use relay_delivery::alloy_client_factory;
use relay_storage::StorageService;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod apis;
mod server;

/// Configuration file used when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Command-line arguments for the relayer service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file; without it `config.toml` is used when
	/// present, otherwise the environment
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the relayer service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file or environment
/// 4. Starts the relay queue worker
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started relayer");

	let config = load_config(args.config.as_deref()).await?;
	tracing::info!(
		chain_id = config.relayer.chain_id,
		contract = config.relayer.contract_address().unwrap_or("<unset>"),
		"Loaded configuration"
	);

	let queue = Arc::new(build_queue(&config));

	let api_config = config.api.clone().unwrap_or_default();
	if !api_config.enabled {
		tracing::warn!("API server disabled, nothing accepts relay requests");
		return Ok(());
	}

	server::start_server(api_config, queue, shutdown_signal()).await?;

	tracing::info!("Stopped relayer");
	Ok(())
}

/// Loads configuration from the given file, the default file, or the
/// environment, in that order of preference.
async fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
	match path {
		Some(path) => Config::from_file(path).await,
		None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
			Config::from_file(DEFAULT_CONFIG_PATH).await
		}
		None => {
			tracing::info!("No configuration file found, reading environment");
			Config::from_env()
		}
	}
}

/// Wires the record store, executor and queue worker together.
fn build_queue(config: &Config) -> RelayQueue {
	let storage = Arc::new(StorageService::in_memory());
	let executor = SubmissionExecutor::new(
		config.relayer.clone(),
		storage.clone(),
		Arc::new(BreakoutGame),
		alloy_client_factory(),
	);
	RelayQueue::start(executor, storage)
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("Failed to listen for shutdown signal: {}", e);
	}
	tracing::info!("Shutdown signal received");
}
