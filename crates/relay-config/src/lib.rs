//! Configuration module for the game relayer.
//!
//! This module provides structures and utilities for managing relayer
//! configuration. Configuration is read from a TOML file in which `${VAR}` and
//! `${VAR:-default}` placeholders are resolved from the environment, or built
//! directly from environment variables when no file is present.
//!
//! Relayer credentials are optional. A relayer started without a key, RPC
//! endpoint or contract address still serves its API and reports the missing
//! setting on every relay request.

#[cfg(any(test, feature = "testing"))]
pub mod builders;

use regex::Regex;
use relay_types::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
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
		// Keep the message, not the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the relayer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Relayer account and chain settings.
	#[serde(default)]
	pub relayer: RelayerConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Settings for the single relayer account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayerConfig {
	/// Hex private key of the funded relayer account, with or without 0x.
	#[serde(default)]
	pub private_key: Option<SecretString>,
	/// HTTP(S) JSON-RPC endpoint of the chain.
	#[serde(default)]
	pub rpc_url: Option<String>,
	/// Address of the deployed BreakoutGame contract.
	#[serde(default)]
	pub contract_address: Option<String>,
	/// Chain ID used for transaction signing.
	/// Defaults to 10143 (Monad testnet).
	#[serde(default = "default_chain_id")]
	pub chain_id: u64,
	/// Upper bound on a single chain call, in seconds.
	/// Unset means chain calls are awaited without a bound.
	#[serde(default)]
	pub submission_timeout_seconds: Option<u64>,
}

fn default_chain_id() -> u64 {
	10143
}

impl RelayerConfig {
	/// Returns the private key unless it is unset or blank.
	pub fn private_key(&self) -> Option<&SecretString> {
		self.private_key.as_ref().filter(|key| !key.is_blank())
	}

	/// Returns the RPC URL unless it is unset or blank.
	pub fn rpc_url(&self) -> Option<&str> {
		non_blank(self.rpc_url.as_deref())
	}

	/// Returns the contract address unless it is unset or blank.
	pub fn contract_address(&self) -> Option<&str> {
		non_blank(self.contract_address.as_deref())
	}

	/// Names the relayer settings that are not configured.
	pub fn missing_settings(&self) -> Vec<&'static str> {
		let mut missing = Vec::new();
		if self.private_key().is_none() {
			missing.push("private_key");
		}
		if self.rpc_url().is_none() {
			missing.push("rpc_url");
		}
		if self.contract_address().is_none() {
			missing.push("contract_address");
		}
		missing
	}
}

impl Default for RelayerConfig {
	fn default() -> Self {
		Self {
			private_key: None,
			rpc_url: None,
			contract_address: None,
			chain_id: default_chain_id(),
			submission_timeout_seconds: None,
		}
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}; an empty default
/// is allowed and is how optional relayer settings are usually templated.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
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

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				}
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment placeholders.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Builds configuration from process environment variables.
	///
	/// Reads `RELAYER_PRIVATE_KEY`, `RPC_URL` (falling back to
	/// `NEXT_PUBLIC_MONAD_RPC_URL`), `GAME_CONTRACT_ADDRESS`, `CHAIN_ID`,
	/// `SUBMISSION_TIMEOUT_SECONDS`, `API_HOST` and `PORT`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_lookup(|key| std::env::var(key).ok())
	}

	/// Builds configuration from an arbitrary variable lookup.
	pub fn from_env_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let parse_number = |key: &str| -> Result<Option<u64>, ConfigError> {
			lookup(key)
				.filter(|v| !v.trim().is_empty())
				.map(|v| {
					v.trim().parse::<u64>().map_err(|e| {
						ConfigError::Parse(format!("Invalid {} '{}': {}", key, v, e))
					})
				})
				.transpose()
		};

		let relayer = RelayerConfig {
			private_key: lookup("RELAYER_PRIVATE_KEY").map(SecretString::from),
			rpc_url: lookup("RPC_URL").or_else(|| lookup("NEXT_PUBLIC_MONAD_RPC_URL")),
			contract_address: lookup("GAME_CONTRACT_ADDRESS"),
			chain_id: parse_number("CHAIN_ID")?.unwrap_or_else(default_chain_id),
			submission_timeout_seconds: parse_number("SUBMISSION_TIMEOUT_SECONDS")?,
		};

		let mut api = ApiConfig::default();
		if let Some(host) = lookup("API_HOST").filter(|h| !h.trim().is_empty()) {
			api.host = host;
		}
		if let Some(port) = parse_number("PORT")? {
			api.port = u16::try_from(port)
				.map_err(|_| ConfigError::Validation(format!("PORT {} is out of range", port)))?;
		}

		let config = Config {
			relayer,
			api: Some(api),
		};
		config.validate()?;
		Ok(config)
	}

	/// Validates the configuration.
	///
	/// Missing relayer settings are not an error here; they are reported per
	/// request. Settings that are present must be well formed.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.relayer.chain_id == 0 {
			return Err(ConfigError::Validation(
				"relayer.chain_id must be greater than 0".into(),
			));
		}

		if self.relayer.submission_timeout_seconds == Some(0) {
			return Err(ConfigError::Validation(
				"relayer.submission_timeout_seconds must be greater than 0".into(),
			));
		}

		if let Some(address) = self.relayer.contract_address() {
			let re = Regex::new(r"^0[xX][0-9a-fA-F]{40}$")
				.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;
			if !re.is_match(address) {
				return Err(ConfigError::Validation(format!(
					"relayer.contract_address '{}' is not a 20-byte hex address",
					address
				)));
			}
		}

		if let Some(url) = self.relayer.rpc_url() {
			if !(url.starts_with("http://") || url.starts_with("https://")) {
				return Err(ConfigError::Validation(format!(
					"relayer.rpc_url '{}' must be an http(s) URL",
					url
				)));
			}
		}

		if let Some(api) = &self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation("api.port cannot be 0".into()));
			}
		}

		let missing = self.relayer.missing_settings();
		if !missing.is_empty() {
			tracing::warn!(
				missing = ?missing,
				"Relayer settings incomplete, relay requests will fail until configured"
			);
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment placeholders and validating
/// the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
