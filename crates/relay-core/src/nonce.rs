//! Nonce tracking for the relayer account.
//!
//! The tracker caches the next sequence number locally and only asks the
//! chain when it has no value, either at startup or after a reset. It is
//! owned by the queue worker and never shared.

use alloy_primitives::Address;
use relay_delivery::{ChainClient, ChainError};

/// Tracks the relayer account's next nonce.
#[derive(Debug, Default)]
pub struct NonceTracker {
	/// Last nonce handed out; `None` means it must be read from the chain.
	current: Option<u64>,
}

impl NonceTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the nonce for the next submission.
	///
	/// Adopts the chain's pending transaction count when unset, otherwise
	/// increments the last issued value. A failed chain query leaves the
	/// tracker unset.
	pub async fn next(
		&mut self,
		client: &dyn ChainClient,
		address: Address,
	) -> Result<u64, ChainError> {
		let nonce = match self.current {
			Some(last) => last + 1,
			None => {
				let pending = client.pending_nonce(address).await?;
				tracing::debug!(nonce = pending, "Synchronized nonce from chain");
				pending
			}
		};
		self.current = Some(nonce);
		Ok(nonce)
	}

	/// Forces the next call to [`NonceTracker::next`] to query the chain.
	pub fn reset(&mut self) {
		self.current = None;
	}

	/// Last nonce handed out, if known.
	pub fn current(&self) -> Option<u64> {
		self.current
	}
}
