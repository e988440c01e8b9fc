//! Transaction history records.
//!
//! Every accepted relay request gets exactly one [`TransactionRecord`]. The
//! record is created as `pending` when the request is admitted and is settled
//! once, to either `completed` or `failed`.

use crate::Action;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a relay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
	/// Accepted and waiting for (or undergoing) submission.
	Pending,
	/// Broadcast to the chain successfully.
	Completed,
	/// Terminally failed; see the record's `error`.
	Failed,
}

impl TransactionStatus {
	/// Returns true once the status can no longer change.
	pub fn is_final(&self) -> bool {
		!matches!(self, TransactionStatus::Pending)
	}
}

/// Externally visible history entry for one relay request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
	/// Monotonically increasing identifier, starting at 1.
	pub id: u64,
	/// Player the action is performed for.
	pub player_address: String,
	/// Requested game action.
	pub action: Action,
	/// Current lifecycle state.
	pub status: TransactionStatus,
	/// 0x-prefixed hash of the broadcast transaction.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
	/// Failure cause, only present when `status` is `failed`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// Unix timestamp (seconds) at admission.
	pub created_at: u64,
	/// Unix timestamp (seconds) of the last status change.
	pub updated_at: u64,
}

impl TransactionRecord {
	/// Creates a new pending record.
	pub fn pending(id: u64, player_address: impl Into<String>, action: Action, now: u64) -> Self {
		Self {
			id,
			player_address: player_address.into(),
			action,
			status: TransactionStatus::Pending,
			tx_hash: None,
			error: None,
			created_at: now,
			updated_at: now,
		}
	}

	/// Applies a settlement outcome to the record.
	pub fn apply(&mut self, outcome: RecordOutcome, now: u64) {
		match outcome {
			RecordOutcome::Completed { tx_hash } => {
				self.status = TransactionStatus::Completed;
				self.tx_hash = Some(tx_hash);
				self.error = None;
			}
			RecordOutcome::Failed { error } => {
				self.status = TransactionStatus::Failed;
				self.error = Some(error);
			}
		}
		self.updated_at = now;
	}
}

/// Final outcome written to a pending record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
	/// The transaction was broadcast with the given hash.
	Completed { tx_hash: String },
	/// The request failed terminally.
	Failed { error: String },
}

impl RecordOutcome {
	/// Status the record ends up in after this outcome.
	pub fn status(&self) -> TransactionStatus {
		match self {
			RecordOutcome::Completed { .. } => TransactionStatus::Completed,
			RecordOutcome::Failed { .. } => TransactionStatus::Failed,
		}
	}
}

/// Aggregate status counts over the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
	pub total: usize,
	pub pending: usize,
	pub completed: usize,
	pub failed: usize,
}

impl TransactionSummary {
	/// Counts statuses over a slice of records.
	pub fn from_records(records: &[TransactionRecord]) -> Self {
		records.iter().fold(Self::default(), |mut acc, record| {
			acc.total += 1;
			match record.status {
				TransactionStatus::Pending => acc.pending += 1,
				TransactionStatus::Completed => acc.completed += 1,
				TransactionStatus::Failed => acc.failed += 1,
			}
			acc
		})
	}
}
