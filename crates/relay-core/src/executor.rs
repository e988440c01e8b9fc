//! Submission of a single relay request.
//!
//! The executor checks the relayer configuration, builds the chain client
//! on first use, obtains a nonce, encodes the call and submits it. A stale
//! nonce is recovered once by resynchronizing from the chain; every other
//! failure is terminal. Each execution writes exactly one record update.

use crate::{ContractBinding, NonceTracker, RelayError};
use alloy_primitives::Address;
use relay_config::RelayerConfig;
use relay_delivery::{ChainClient, ChainClientFactory, ChainError, RelayerCredentials};
use relay_storage::StorageService;
use relay_types::{truncate_id, Action, ContractCall, TransactionHash};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Executes queued relay requests one at a time.
///
/// Holds the relayer's nonce state, so it must be owned by exactly one task.
pub struct SubmissionExecutor {
	settings: RelayerConfig,
	storage: Arc<StorageService>,
	binding: Arc<dyn ContractBinding>,
	client_factory: ChainClientFactory,
	/// Built on first successful configuration check, then reused.
	client: Option<Arc<dyn ChainClient>>,
	nonces: NonceTracker,
	timeout: Option<Duration>,
}

impl SubmissionExecutor {
	pub fn new(
		settings: RelayerConfig,
		storage: Arc<StorageService>,
		binding: Arc<dyn ContractBinding>,
		client_factory: ChainClientFactory,
	) -> Self {
		let timeout = settings.submission_timeout_seconds.map(Duration::from_secs);
		Self {
			settings,
			storage,
			binding,
			client_factory,
			client: None,
			nonces: NonceTracker::new(),
			timeout,
		}
	}

	/// Nonce state, for observability.
	pub fn nonces(&self) -> &NonceTracker {
		&self.nonces
	}

	/// Submits the transaction for record `id` and settles the record.
	#[instrument(skip_all, fields(record_id = id, action = %action))]
	pub async fn execute(
		&mut self,
		player_address: &str,
		action: Action,
		id: u64,
	) -> Result<TransactionHash, RelayError> {
		let result = self.submit(player_address, action).await;

		let update = match &result {
			Ok(tx_hash) => {
				let tx_hash = tx_hash.to_hex();
				tracing::info!(tx_hash = %truncate_id(&tx_hash), "Relayed transaction");
				self.storage.mark_completed(id, &tx_hash).await
			}
			Err(e) => {
				tracing::warn!(error = %e, "Relay request failed");
				self.storage.mark_failed(id, &e.to_string()).await
			}
		};
		if let Err(e) = update {
			tracing::error!("Failed to update transaction record: {}", e);
		}

		result
	}

	async fn submit(
		&mut self,
		player_address: &str,
		action: Action,
	) -> Result<TransactionHash, RelayError> {
		let (credentials, contract) = self.resolve_settings()?;
		let client = self.client(&credentials)?;
		let call = ContractCall {
			to: contract,
			data: self.binding.encode(action, player_address)?,
		};

		match self.attempt(client.as_ref(), call.clone()).await {
			Err(ChainError::NonceTooLow(message)) => {
				tracing::warn!(
					stale_nonce = ?self.nonces.current(),
					"Nonce too low, resynchronizing from chain: {}",
					message
				);
				self.nonces.reset();
				let retried = self.attempt(client.as_ref(), call).await;
				retried.map_err(|e| self.terminal(e))
			}
			other => other.map_err(|e| self.terminal(e)),
		}
	}

	/// One nonce-then-submit round.
	async fn attempt(
		&mut self,
		client: &dyn ChainClient,
		call: ContractCall,
	) -> Result<TransactionHash, ChainError> {
		let timeout = self.timeout;
		let nonce = bounded(timeout, self.nonces.next(client, client.address())).await?;
		tracing::debug!(nonce, "Submitting transaction");
		bounded(timeout, client.submit(call, nonce)).await
	}

	/// Converts a final chain failure into the caller-facing error.
	///
	/// The rejected transaction never consumed its nonce, so the tracker is
	/// resynchronized before the next request.
	fn terminal(&mut self, err: ChainError) -> RelayError {
		self.nonces.reset();
		match err {
			ChainError::NonceTooLow(message) => RelayError::Nonce(message),
			ChainError::Rejected(message) | ChainError::Network(message) => {
				RelayError::Chain(message)
			}
			ChainError::Credentials(message) => RelayError::Configuration(message),
		}
	}

	/// Checks that every relayer setting is present and parseable.
	fn resolve_settings(&self) -> Result<(RelayerCredentials, Address), RelayError> {
		let missing = self.settings.missing_settings();
		if !missing.is_empty() {
			return Err(RelayError::Configuration(missing.join(", ")));
		}

		let (Some(private_key), Some(rpc_url), Some(contract)) = (
			self.settings.private_key(),
			self.settings.rpc_url(),
			self.settings.contract_address(),
		) else {
			return Err(RelayError::Configuration(
				"relayer settings incomplete".to_string(),
			));
		};

		let contract: Address = contract.parse().map_err(|e| {
			RelayError::Configuration(format!("invalid contract address {}: {}", contract, e))
		})?;

		Ok((
			RelayerCredentials {
				private_key: private_key.clone(),
				rpc_url: rpc_url.to_string(),
				chain_id: self.settings.chain_id,
			},
			contract,
		))
	}

	fn client(
		&mut self,
		credentials: &RelayerCredentials,
	) -> Result<Arc<dyn ChainClient>, RelayError> {
		if let Some(client) = &self.client {
			return Ok(client.clone());
		}

		let client = (self.client_factory)(credentials)
			.map_err(|e| RelayError::Configuration(e.to_string()))?;
		tracing::info!(relayer = %client.address(), "Initialized relayer chain client");
		self.client = Some(client.clone());
		Ok(client)
	}
}

async fn bounded<T>(
	limit: Option<Duration>,
	fut: impl Future<Output = Result<T, ChainError>>,
) -> Result<T, ChainError> {
	match limit {
		Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
			ChainError::Network(format!("chain call timed out after {}s", limit.as_secs()))
		})?,
		None => fut.await,
	}
}
