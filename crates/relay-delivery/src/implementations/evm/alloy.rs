//! Alloy-based chain client for EVM networks.
//!
//! Submits relayer transactions over HTTP JSON-RPC. The provider's wallet
//! signs; gas and chain id are filled by the recommended fillers while the
//! nonce is always supplied by the caller.

use crate::{ChainClient, ChainError, RelayerCredentials};
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use async_trait::async_trait;
use relay_types::{ContractCall, TransactionHash};
use std::sync::Arc;

/// Node error fragments meaning the submitted nonce was already consumed.
const NONCE_TOO_LOW_PATTERNS: &[&str] = &["nonce too low", "nonce has already been used"];

/// Alloy-based EVM chain client bound to the relayer account.
pub struct AlloyDelivery {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	address: Address,
	chain_id: u64,
}

impl AlloyDelivery {
	/// Creates a new AlloyDelivery instance.
	///
	/// Parses the key and RPC URL; no network request is made.
	pub fn new(credentials: &RelayerCredentials) -> Result<Self, ChainError> {
		let signer: PrivateKeySigner = credentials.private_key.to_prefixed_hex().with_exposed(|key| {
			key.parse()
				.map_err(|_| ChainError::Credentials("Invalid private key format".to_string()))
		})?;
		let address = signer.address();

		let url = credentials
			.rpc_url
			.parse()
			.map_err(|e| ChainError::Credentials(format!("Invalid RPC URL: {}", e)))?;

		let wallet = EthereumWallet::from(signer.with_chain_id(Some(credentials.chain_id)));
		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		Ok(Self {
			provider: Arc::new(provider),
			address,
			chain_id: credentials.chain_id,
		})
	}
}

#[async_trait]
impl ChainClient for AlloyDelivery {
	fn address(&self) -> Address {
		self.address
	}

	async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
		self.provider
			.get_transaction_count(address)
			.pending()
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get nonce: {}", e)))
	}

	async fn submit(&self, call: ContractCall, nonce: u64) -> Result<TransactionHash, ChainError> {
		let request = TransactionRequest::default()
			.to(call.to)
			.input(call.data.into())
			.nonce(nonce);

		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(classify_send_error)?;

		let tx_hash = *pending_tx.tx_hash();
		tracing::info!(
			tx_hash = %tx_hash,
			nonce,
			chain_id = self.chain_id,
			"Submitted transaction"
		);

		Ok(TransactionHash(tx_hash.0.to_vec()))
	}
}

/// Maps a send failure onto the structured chain error.
///
/// Node error responses are rejections; anything else never reached a node
/// verdict and counts as a network failure.
fn classify_send_error(err: TransportError) -> ChainError {
	match err.as_error_resp() {
		Some(payload) => classify_rejection(&payload.message),
		None => ChainError::Network(err.to_string()),
	}
}

fn classify_rejection(message: &str) -> ChainError {
	let lowered = message.to_lowercase();
	if NONCE_TOO_LOW_PATTERNS.iter().any(|p| lowered.contains(p)) {
		ChainError::NonceTooLow(message.to_string())
	} else {
		ChainError::Rejected(message.to_string())
	}
}

/// Factory function to create the alloy chain client from relayer credentials.
pub fn create_alloy_client(
	credentials: &RelayerCredentials,
) -> Result<Arc<dyn ChainClient>, ChainError> {
	Ok(Arc::new(AlloyDelivery::new(credentials)?))
}
