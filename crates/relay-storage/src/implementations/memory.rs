//! In-memory record store backend.
//!
//! Records live in a vector ordered by id for the lifetime of the process.
//! There is no deletion or compaction: the chain is the ledger of record and
//! this log is operational history only.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use relay_types::{current_timestamp, Action, RecordOutcome, TransactionRecord};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
	/// Records in insertion order, which is also ascending id order.
	records: Vec<TransactionRecord>,
	/// Last id handed out; 0 means none yet.
	last_id: u64,
}

impl Inner {
	fn position(&self, id: u64) -> Option<usize> {
		self.records.binary_search_by_key(&id, |r| r.id).ok()
	}
}

/// In-memory storage implementation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	inner: RwLock<Inner>,
}

impl MemoryStorage {
	/// Creates a new, empty MemoryStorage.
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn append(&self, player_address: &str, action: Action) -> Result<u64, StorageError> {
		let mut inner = self.inner.write().await;
		let id = inner.last_id + 1;
		inner.last_id = id;
		inner.records.push(TransactionRecord::pending(
			id,
			player_address,
			action,
			current_timestamp(),
		));
		Ok(id)
	}

	async fn update(&self, id: u64, outcome: RecordOutcome) -> Result<(), StorageError> {
		let mut inner = self.inner.write().await;
		let index = inner.position(id).ok_or(StorageError::NotFound(id))?;
		let record = &mut inner.records[index];

		if record.status.is_final() {
			return Err(StorageError::InvalidTransition {
				id,
				from: record.status,
				to: outcome.status(),
			});
		}

		record.apply(outcome, current_timestamp());
		Ok(())
	}

	async fn get(&self, id: u64) -> Result<Option<TransactionRecord>, StorageError> {
		let inner = self.inner.read().await;
		Ok(inner.position(id).map(|index| inner.records[index].clone()))
	}

	async fn list(&self) -> Result<Vec<TransactionRecord>, StorageError> {
		Ok(self.inner.read().await.records.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_types::TransactionStatus;

	#[tokio::test]
	async fn test_append_assigns_sequential_ids() {
		let storage = MemoryStorage::new();

		for expected in 1..=3 {
			let id = storage.append("0xAAA", Action::BreakBrick).await.unwrap();
			assert_eq!(id, expected);
		}

		let ids: Vec<u64> = storage.list().await.unwrap().iter().map(|r| r.id).collect();
		assert_eq!(ids, vec![1, 2, 3]);
	}

	#[tokio::test]
	async fn test_new_record_is_pending() {
		let storage = MemoryStorage::new();
		let id = storage.append("0xBBB", Action::StartGame).await.unwrap();

		let record = storage.get(id).await.unwrap().unwrap();
		assert_eq!(record.player_address, "0xBBB");
		assert_eq!(record.action, Action::StartGame);
		assert_eq!(record.status, TransactionStatus::Pending);
		assert_eq!(record.tx_hash, None);
		assert_eq!(record.error, None);
	}

	#[tokio::test]
	async fn test_update_completed() {
		let storage = MemoryStorage::new();
		let id = storage.append("0xAAA", Action::BreakBrick).await.unwrap();

		storage
			.update(
				id,
				RecordOutcome::Completed {
					tx_hash: "0xfeed".to_string(),
				},
			)
			.await
			.unwrap();

		let record = storage.get(id).await.unwrap().unwrap();
		assert_eq!(record.status, TransactionStatus::Completed);
		assert_eq!(record.tx_hash.as_deref(), Some("0xfeed"));
	}

	#[tokio::test]
	async fn test_update_unknown_id() {
		let storage = MemoryStorage::new();
		let result = storage
			.update(
				42,
				RecordOutcome::Failed {
					error: "boom".to_string(),
				},
			)
			.await;
		assert!(matches!(result, Err(StorageError::NotFound(42))));
	}

	#[tokio::test]
	async fn test_settled_record_cannot_move_backward() {
		let storage = MemoryStorage::new();
		let id = storage.append("0xAAA", Action::BreakBrick).await.unwrap();

		storage
			.update(
				id,
				RecordOutcome::Failed {
					error: "nonce too low".to_string(),
				},
			)
			.await
			.unwrap();

		let result = storage
			.update(
				id,
				RecordOutcome::Completed {
					tx_hash: "0x01".to_string(),
				},
			)
			.await;
		assert!(matches!(
			result,
			Err(StorageError::InvalidTransition {
				from: TransactionStatus::Failed,
				to: TransactionStatus::Completed,
				..
			})
		));

		let record = storage.get(id).await.unwrap().unwrap();
		assert_eq!(record.status, TransactionStatus::Failed);
	}

	#[tokio::test]
	async fn test_list_returns_detached_snapshot() {
		let storage = MemoryStorage::new();
		storage.append("0xAAA", Action::BreakBrick).await.unwrap();

		let mut snapshot = storage.list().await.unwrap();
		snapshot[0].status = TransactionStatus::Completed;
		snapshot.clear();

		let fresh = storage.list().await.unwrap();
		assert_eq!(fresh.len(), 1);
		assert_eq!(fresh[0].status, TransactionStatus::Pending);
	}
}
