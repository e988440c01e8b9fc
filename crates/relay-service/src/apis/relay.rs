//! Relay API Implementation
//!
//! Accepts gasless game actions and waits for the relayer queue to submit
//! them. The response carries the broadcast transaction hash; inclusion is
//! not awaited.

use relay_core::{validate_request, RelayError, RelayQueue};
use relay_types::{APIError, RelayRequest, RelayResponse};
use tracing::{info, warn};

/// Processes a POST /api/relay request.
pub async fn relay_action(
	queue: &RelayQueue,
	request: RelayRequest,
) -> Result<RelayResponse, APIError> {
	let (player_address, action) = validate_request(&request).map_err(relay_error)?;

	let receipt = queue
		.submit(&player_address, action)
		.await
		.map_err(|e| {
			warn!(action = %action, "Relay request failed: {}", e);
			relay_error(e)
		})?;

	let tx_hash = receipt.tx_hash.to_hex();
	info!(record_id = receipt.id, action = %action, tx_hash = %tx_hash, "Relay request completed");

	Ok(RelayResponse {
		success: true,
		tx_hash,
	})
}

/// Maps a queue failure onto the HTTP error it is reported as.
pub fn relay_error(err: RelayError) -> APIError {
	let message = err.to_string();
	match err {
		RelayError::Validation(_) => APIError::BadRequest {
			error_type: "INVALID_REQUEST".to_string(),
			message,
		},
		RelayError::QueueClosed => APIError::ServiceUnavailable {
			error_type: "QUEUE_CLOSED".to_string(),
			message,
		},
		RelayError::Configuration(_) => APIError::InternalServerError {
			error_type: "RELAYER_NOT_CONFIGURED".to_string(),
			message,
		},
		RelayError::Nonce(_) | RelayError::Chain(_) | RelayError::Encoding(_) => {
			APIError::InternalServerError {
				error_type: "SUBMISSION_FAILED".to_string(),
				message,
			}
		}
		RelayError::Storage(_) => APIError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_relay_error_status_codes() {
		assert_eq!(
			relay_error(RelayError::Validation("Missing playerAddress or action".into()))
				.status_code(),
			400
		);
		assert_eq!(relay_error(RelayError::QueueClosed).status_code(), 503);
		assert_eq!(
			relay_error(RelayError::Chain("execution reverted".into())).status_code(),
			500
		);
	}

	#[test]
	fn test_relay_error_keeps_message() {
		let body = relay_error(RelayError::Chain("execution reverted".into())).to_error_response();
		assert_eq!(body.error, "execution reverted");
		assert_eq!(body.code, "SUBMISSION_FAILED");
	}
}
