//! Configuration builder for test and development configurations.

use crate::{ApiConfig, Config, RelayerConfig};
use relay_types::SecretString;

/// Well-known development key (first anvil/hardhat account).
pub const DEV_PRIVATE_KEY: &str =
	"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Builder for creating `Config` instances with a fluent API.
///
/// Defaults to a fully configured local relayer so that tests only spell out
/// the setting they want to remove or change.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	private_key: Option<String>,
	rpc_url: Option<String>,
	contract_address: Option<String>,
	chain_id: u64,
	submission_timeout_seconds: Option<u64>,
	api: Option<ApiConfig>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with values suitable for testing.
	pub fn new() -> Self {
		Self {
			private_key: Some(DEV_PRIVATE_KEY.to_string()),
			rpc_url: Some("http://localhost:8545".to_string()),
			contract_address: Some("0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string()),
			chain_id: 31337,
			submission_timeout_seconds: None,
			api: None,
		}
	}

	/// Sets or clears the relayer private key.
	pub fn private_key(mut self, key: Option<&str>) -> Self {
		self.private_key = key.map(str::to_string);
		self
	}

	/// Sets or clears the RPC URL.
	pub fn rpc_url(mut self, url: Option<&str>) -> Self {
		self.rpc_url = url.map(str::to_string);
		self
	}

	/// Sets or clears the game contract address.
	pub fn contract_address(mut self, address: Option<&str>) -> Self {
		self.contract_address = address.map(str::to_string);
		self
	}

	/// Sets the chain ID.
	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	/// Sets the per-call submission timeout.
	pub fn submission_timeout_seconds(mut self, seconds: Option<u64>) -> Self {
		self.submission_timeout_seconds = seconds;
		self
	}

	/// Sets the API configuration.
	pub fn api(mut self, api: Option<ApiConfig>) -> Self {
		self.api = api;
		self
	}

	/// Builds the relayer section only.
	pub fn build_relayer(&self) -> RelayerConfig {
		RelayerConfig {
			private_key: self.private_key.clone().map(SecretString::new),
			rpc_url: self.rpc_url.clone(),
			contract_address: self.contract_address.clone(),
			chain_id: self.chain_id,
			submission_timeout_seconds: self.submission_timeout_seconds,
		}
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		Config {
			relayer: self.build_relayer(),
			api: self.api,
		}
	}
}
