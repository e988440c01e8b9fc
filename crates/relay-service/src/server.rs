//! HTTP server for the relayer API.
//!
//! Exposes the relay endpoint and the read-only transaction history under
//! `/api`, plus a `/health` probe at the root.

use axum::{
	extract::{rejection::JsonRejection, Path, State},
	response::Json,
	routing::get,
	Router,
};
use relay_config::ApiConfig;
use relay_core::RelayQueue;
use relay_types::{
	APIError, HealthResponse, RelayRequest, RelayResponse, SummaryResponse, TransactionRecord,
	TransactionsResponse,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Relayer queue; also gives access to the record store.
	pub queue: Arc<RelayQueue>,
}

/// Builds the router with all relayer routes.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/relay", get(handle_list_relay).post(handle_relay))
				.route("/transactions", get(handle_transactions))
				.route("/transactions/summary", get(handle_summary))
				.route("/transactions/{id}", get(handle_transaction_by_id)),
		)
		.route("/health", get(handle_health))
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server and serves until `shutdown` resolves.
pub async fn start_server(
	api_config: ApiConfig,
	queue: Arc<RelayQueue>,
	shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { queue });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Relayer API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await?;

	Ok(())
}

/// Handles POST /api/relay requests.
///
/// Waits until the request has been broadcast or has failed.
async fn handle_relay(
	State(state): State<AppState>,
	payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayResponse>, APIError> {
	let Json(request) = payload.map_err(|e| APIError::BadRequest {
		error_type: "INVALID_JSON".to_string(),
		message: e.body_text(),
	})?;

	crate::apis::relay::relay_action(&state.queue, request)
		.await
		.map(Json)
}

/// Handles GET /api/relay requests with the bare record list.
async fn handle_list_relay(
	State(state): State<AppState>,
) -> Result<Json<Vec<TransactionRecord>>, APIError> {
	crate::apis::transactions::list_transactions(state.queue.storage())
		.await
		.map(Json)
}

/// Handles GET /api/transactions requests.
async fn handle_transactions(
	State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, APIError> {
	crate::apis::transactions::get_transactions(state.queue.storage())
		.await
		.map(Json)
}

/// Handles GET /api/transactions/{id} requests.
async fn handle_transaction_by_id(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<TransactionRecord>, APIError> {
	match crate::apis::transactions::get_transaction_by_id(state.queue.storage(), &id).await {
		Ok(record) => Ok(Json(record)),
		Err(e) => {
			tracing::debug!("Transaction lookup failed: {}", e);
			Err(e)
		}
	}
}

/// Handles GET /api/transactions/summary requests.
async fn handle_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, APIError> {
	crate::apis::transactions::get_summary(state.queue.storage())
		.await
		.map(Json)
}

/// Handles GET /health requests.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok".to_string(),
		queued: state.queue.pending_len(),
		executing: state.queue.is_executing(),
	})
}
