//! Core relayer queue for gasless game actions.
//!
//! This module serializes player actions into transactions signed by one
//! relayer account. Requests from any number of callers are admitted into a
//! single FIFO queue; one worker task owns the nonce tracker and the
//! submission executor, so at most one transaction is ever in flight and
//! nonces are assigned in broadcast order.

use relay_storage::StorageError;
use relay_types::{Action, RelayRequest};
use thiserror::Error;

/// Contract binding for the game contract.
pub mod contract;
/// Submission of one queued request, including the stale-nonce retry.
pub mod executor;
/// Relayer account nonce tracking.
pub mod nonce;
/// Admission and single-flight draining of work items.
pub mod queue;

#[cfg(test)]
pub(crate) mod test_support;

pub use contract::{BreakoutGame, ContractBinding};
pub use executor::SubmissionExecutor;
pub use nonce::NonceTracker;
pub use queue::{RelayQueue, RelayReceipt, RelayTicket};

/// Errors that settle a relay request.
///
/// The display text is the human-readable message reported to the caller
/// and stored on the failed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
	/// Relayer credentials, RPC endpoint or contract address missing or invalid.
	#[error("Relayer configuration missing or invalid: {0}")]
	Configuration(String),
	/// The nonce was still stale after resynchronizing from the chain.
	#[error("Nonce too low: {0}")]
	Nonce(String),
	/// The chain rejected the transaction or could not be reached.
	#[error("{0}")]
	Chain(String),
	/// Malformed request, rejected before any record is created.
	#[error("{0}")]
	Validation(String),
	/// The contract call could not be encoded.
	#[error("Encoding error: {0}")]
	Encoding(String),
	/// The record store refused an operation.
	#[error("Storage error: {0}")]
	Storage(String),
	/// The worker is gone and the request can no longer be executed.
	#[error("Relay queue is closed")]
	QueueClosed,
}

impl From<StorageError> for RelayError {
	fn from(err: StorageError) -> Self {
		RelayError::Storage(err.to_string())
	}
}

/// Checks a relay request and extracts the player and action.
///
/// A blank player address, a missing action or an unknown action name is
/// rejected here, before the request reaches the record store.
pub fn validate_request(request: &RelayRequest) -> Result<(String, Action), RelayError> {
	let player = request
		.player_address
		.as_deref()
		.map(str::trim)
		.filter(|p| !p.is_empty());
	let action = request
		.action
		.as_deref()
		.map(str::trim)
		.filter(|a| !a.is_empty());

	let (Some(player), Some(action)) = (player, action) else {
		return Err(RelayError::Validation(
			"Missing playerAddress or action".to_string(),
		));
	};

	let action = action
		.parse::<Action>()
		.map_err(|e| RelayError::Validation(e.to_string()))?;

	Ok((player.to_string(), action))
}
