//! Transaction history API Implementation
//!
//! Read-only views over the relayer's record store.

use relay_storage::{StorageError, StorageService};
use relay_types::{APIError, SummaryResponse, TransactionRecord, TransactionsResponse};

/// Lists every record in insertion order.
pub async fn list_transactions(storage: &StorageService) -> Result<Vec<TransactionRecord>, APIError> {
	storage.list().await.map_err(storage_error)
}

/// Processes a GET /api/transactions request.
pub async fn get_transactions(storage: &StorageService) -> Result<TransactionsResponse, APIError> {
	Ok(TransactionsResponse {
		transactions: list_transactions(storage).await?,
	})
}

/// Processes a GET /api/transactions/{id} request.
pub async fn get_transaction_by_id(
	storage: &StorageService,
	id: &str,
) -> Result<TransactionRecord, APIError> {
	let id: u64 = id.parse().map_err(|_| APIError::BadRequest {
		error_type: "INVALID_TRANSACTION_ID".to_string(),
		message: format!("Transaction id must be a positive integer: {}", id),
	})?;

	storage
		.get(id)
		.await
		.map_err(storage_error)?
		.ok_or_else(|| APIError::NotFound {
			error_type: "TRANSACTION_NOT_FOUND".to_string(),
			message: format!("Transaction {} not found", id),
		})
}

/// Processes a GET /api/transactions/summary request.
pub async fn get_summary(storage: &StorageService) -> Result<SummaryResponse, APIError> {
	let summary = storage.summary().await.map_err(storage_error)?;
	Ok(SummaryResponse { summary })
}

fn storage_error(err: StorageError) -> APIError {
	APIError::InternalServerError {
		error_type: "STORAGE_ERROR".to_string(),
		message: err.to_string(),
	}
}
