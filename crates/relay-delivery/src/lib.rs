//! Transaction delivery module for the game relayer.
//!
//! This module defines the chain client seam the relayer submits through:
//! a pending-nonce query and a nonce-pinned contract call submission. Chain
//! failures come back as a structured [`ChainError`] so callers never have to
//! inspect node error text.

use alloy_primitives::Address;
use async_trait::async_trait;
use relay_types::{ContractCall, SecretString, TransactionHash};
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur while talking to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
	/// The node reports the nonce as already consumed.
	#[error("Nonce too low: {0}")]
	NonceTooLow(String),
	/// The node rejected the transaction for any other reason.
	#[error("Transaction rejected: {0}")]
	Rejected(String),
	/// Transport failure or timeout; the node may never have seen the request.
	#[error("Network error: {0}")]
	Network(String),
	/// The client could not be built from the supplied credentials.
	#[error("Invalid credentials: {0}")]
	Credentials(String),
}

impl ChainError {
	/// Returns true when retrying with a freshly queried nonce can succeed.
	pub fn is_nonce_too_low(&self) -> bool {
		matches!(self, ChainError::NonceTooLow(_))
	}
}

/// Everything needed to sign and broadcast as the relayer account.
#[derive(Debug, Clone)]
pub struct RelayerCredentials {
	/// Relayer signing key.
	pub private_key: SecretString,
	/// JSON-RPC endpoint.
	pub rpc_url: String,
	/// Chain the signer is bound to.
	pub chain_id: u64,
}

/// Trait defining the interface for chain clients.
///
/// A client is bound to one signing account. Implementations sign and
/// broadcast but never wait for inclusion.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Address of the signing account.
	fn address(&self) -> Address;

	/// Returns the account's transaction count including pending transactions.
	async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError>;

	/// Signs and broadcasts a contract call with an explicit nonce.
	async fn submit(&self, call: ContractCall, nonce: u64) -> Result<TransactionHash, ChainError>;
}

/// Builds a chain client from relayer credentials.
pub type ChainClientFactory =
	Arc<dyn Fn(&RelayerCredentials) -> Result<Arc<dyn ChainClient>, ChainError> + Send + Sync>;

/// Returns the factory for the alloy HTTP chain client.
pub fn alloy_client_factory() -> ChainClientFactory {
	Arc::new(implementations::evm::alloy::create_alloy_client)
}
