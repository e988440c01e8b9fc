//! Storage module for the relayer transaction history.
//!
//! The record store is an append/update log holding one
//! [`TransactionRecord`] per accepted relay request. It is the single source
//! of truth for request history; external callers only ever read snapshots.

use async_trait::async_trait;
use relay_types::{Action, RecordOutcome, TransactionRecord, TransactionStatus, TransactionSummary};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// No record exists with the given id.
	#[error("Transaction record {0} not found")]
	NotFound(u64),
	/// The record already left `pending` and cannot change again.
	#[error("Invalid transition for record {id}: {from:?} -> {to:?}")]
	InvalidTransition {
		id: u64,
		from: TransactionStatus,
		to: TransactionStatus,
	},
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for record store backends.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Appends a new pending record and returns its id.
	///
	/// Ids start at 1, increase by one per call, and are never reused.
	async fn append(&self, player_address: &str, action: Action) -> Result<u64, StorageError>;

	/// Settles a pending record with its final outcome.
	///
	/// Fails with `NotFound` for an unknown id and `InvalidTransition` when the
	/// record is no longer pending.
	async fn update(&self, id: u64, outcome: RecordOutcome) -> Result<(), StorageError>;

	/// Returns a copy of one record.
	async fn get(&self, id: u64) -> Result<Option<TransactionRecord>, StorageError>;

	/// Returns a snapshot of all records in insertion order.
	async fn list(&self) -> Result<Vec<TransactionRecord>, StorageError>;
}

/// High-level record store service.
///
/// Wraps a backend and adds logging and aggregate queries.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Creates a StorageService over a fresh in-memory backend.
	pub fn in_memory() -> Self {
		Self::new(Box::new(implementations::memory::MemoryStorage::new()))
	}

	/// Appends a pending record for a newly accepted request.
	pub async fn append(&self, player_address: &str, action: Action) -> Result<u64, StorageError> {
		let id = self.backend.append(player_address, action).await?;
		tracing::debug!(record_id = id, action = %action, "Recorded pending transaction");
		Ok(id)
	}

	/// Marks a record as completed with the broadcast transaction hash.
	pub async fn mark_completed(&self, id: u64, tx_hash: &str) -> Result<(), StorageError> {
		self.backend
			.update(
				id,
				RecordOutcome::Completed {
					tx_hash: tx_hash.to_string(),
				},
			)
			.await
	}

	/// Marks a record as failed with a human-readable cause.
	pub async fn mark_failed(&self, id: u64, error: &str) -> Result<(), StorageError> {
		self.backend
			.update(
				id,
				RecordOutcome::Failed {
					error: error.to_string(),
				},
			)
			.await
	}

	/// Returns a copy of one record.
	pub async fn get(&self, id: u64) -> Result<Option<TransactionRecord>, StorageError> {
		self.backend.get(id).await
	}

	/// Returns a snapshot of all records in insertion order.
	pub async fn list(&self) -> Result<Vec<TransactionRecord>, StorageError> {
		self.backend.list().await
	}

	/// Counts records by status.
	pub async fn summary(&self) -> Result<TransactionSummary, StorageError> {
		let records = self.backend.list().await?;
		Ok(TransactionSummary::from_records(&records))
	}
}
