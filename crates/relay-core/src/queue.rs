//! Serial relay queue.
//!
//! Callers are admitted concurrently; admission appends the pending record
//! and pushes the work item under one lock, so record ids follow queue
//! order. A single worker task drains the channel, running one submission
//! at a time and settling each caller's ticket exactly once.

use crate::{RelayError, SubmissionExecutor};
use relay_storage::StorageService;
use relay_types::{Action, TransactionHash};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot, Mutex};

/// Successful settlement of a relay request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReceipt {
	/// Id of the transaction record.
	pub id: u64,
	/// Hash of the broadcast transaction.
	pub tx_hash: TransactionHash,
}

type Settlement = Result<RelayReceipt, RelayError>;

struct WorkItem {
	id: u64,
	player_address: String,
	action: Action,
	reply: oneshot::Sender<Settlement>,
}

#[derive(Debug, Default)]
struct QueueStatus {
	queued: AtomicUsize,
	executing: AtomicBool,
}

/// Handle to one admitted request; resolves when the request settles.
#[derive(Debug)]
pub struct RelayTicket {
	id: u64,
	receiver: oneshot::Receiver<Settlement>,
}

impl RelayTicket {
	/// Id of the pending record created at admission.
	pub fn id(&self) -> u64 {
		self.id
	}
}

impl Future for RelayTicket {
	type Output = Settlement;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.receiver)
			.poll(cx)
			.map(|settled| settled.unwrap_or(Err(RelayError::QueueClosed)))
	}
}

/// FIFO queue with single-flight execution against one relayer account.
pub struct RelayQueue {
	storage: Arc<StorageService>,
	/// Held across record append and channel push.
	admission: Mutex<mpsc::UnboundedSender<WorkItem>>,
	status: Arc<QueueStatus>,
}

impl RelayQueue {
	/// Starts the worker task that owns `executor`.
	///
	/// Must be called from within a tokio runtime. The worker stops once the
	/// queue is dropped and the remaining items have been drained.
	pub fn start(executor: SubmissionExecutor, storage: Arc<StorageService>) -> Self {
		let (sender, receiver) = mpsc::unbounded_channel();
		let status = Arc::new(QueueStatus::default());

		tokio::spawn(run_worker(executor, receiver, status.clone()));

		Self {
			storage,
			admission: Mutex::new(sender),
			status,
		}
	}

	/// Admits a request and returns immediately with its ticket.
	///
	/// The pending record is visible in the store before this returns. A blank
	/// player address is rejected without creating a record.
	pub async fn enqueue(
		&self,
		player_address: &str,
		action: Action,
	) -> Result<RelayTicket, RelayError> {
		let player_address = player_address.trim();
		if player_address.is_empty() {
			return Err(RelayError::Validation(
				"Missing playerAddress or action".to_string(),
			));
		}

		let sender = self.admission.lock().await;
		let id = self.storage.append(player_address, action).await?;
		let (reply, receiver) = oneshot::channel();

		self.status.queued.fetch_add(1, Ordering::SeqCst);
		let item = WorkItem {
			id,
			player_address: player_address.to_string(),
			action,
			reply,
		};
		if sender.send(item).is_err() {
			self.status.queued.fetch_sub(1, Ordering::SeqCst);
			let closed = RelayError::QueueClosed;
			if let Err(e) = self.storage.mark_failed(id, &closed.to_string()).await {
				tracing::error!(record_id = id, "Failed to update transaction record: {}", e);
			}
			return Err(closed);
		}

		tracing::debug!(record_id = id, action = %action, "Queued relay request");
		Ok(RelayTicket { id, receiver })
	}

	/// Admits a request and waits for its settlement.
	pub async fn submit(
		&self,
		player_address: &str,
		action: Action,
	) -> Result<RelayReceipt, RelayError> {
		self.enqueue(player_address, action).await?.await
	}

	/// Work items admitted but not yet picked up by the worker.
	pub fn pending_len(&self) -> usize {
		self.status.queued.load(Ordering::SeqCst)
	}

	/// Whether a submission is currently in flight.
	pub fn is_executing(&self) -> bool {
		self.status.executing.load(Ordering::SeqCst)
	}

	/// Record store shared with the worker.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}
}

async fn run_worker(
	mut executor: SubmissionExecutor,
	mut receiver: mpsc::UnboundedReceiver<WorkItem>,
	status: Arc<QueueStatus>,
) {
	while let Some(item) = receiver.recv().await {
		status.executing.store(true, Ordering::SeqCst);
		status.queued.fetch_sub(1, Ordering::SeqCst);

		let settlement = executor
			.execute(&item.player_address, item.action, item.id)
			.await
			.map(|tx_hash| RelayReceipt {
				id: item.id,
				tx_hash,
			});

		status.executing.store(false, Ordering::SeqCst);
		if item.reply.send(settlement).is_err() {
			tracing::debug!(record_id = item.id, "Caller stopped waiting for relay result");
		}
	}

	tracing::info!("Relay queue worker stopped");
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{hash_for, stub_factory, StubBinding, StubChain};
	use relay_config::builders::ConfigBuilder;
	use relay_delivery::ChainError;
	use relay_types::TransactionStatus;
	use std::time::Duration;

	fn start_queue(builder: ConfigBuilder, chain: &Arc<StubChain>) -> RelayQueue {
		let storage = Arc::new(StorageService::in_memory());
		let (factory, _) = stub_factory(chain);
		let executor = SubmissionExecutor::new(
			builder.build_relayer(),
			storage.clone(),
			Arc::new(StubBinding),
			factory,
		);
		RelayQueue::start(executor, storage)
	}

	#[tokio::test]
	async fn test_two_actions_complete_in_order() {
		let chain = Arc::new(StubChain::new(vec![5]));
		let queue = start_queue(ConfigBuilder::new(), &chain);

		let first = queue.enqueue("0xAAA", Action::StartGame).await.unwrap();
		let second = queue.enqueue("0xAAA", Action::BreakBrick).await.unwrap();
		assert_eq!((first.id(), second.id()), (1, 2));

		let first = first.await.unwrap();
		let second = second.await.unwrap();
		assert_eq!(first.tx_hash, hash_for(5));
		assert_eq!(second.tx_hash, hash_for(6));

		let records = queue.storage().list().await.unwrap();
		assert_eq!(records.len(), 2);
		assert_eq!(records[0].id, 1);
		assert_eq!(records[1].id, 2);
		assert!(records
			.iter()
			.all(|r| r.status == TransactionStatus::Completed));
		assert_eq!(
			chain.submitted_data(),
			vec!["startGame:0xAAA", "breakBrick:0xAAA"]
		);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_enqueues_are_fifo_and_single_flight() {
		let chain = Arc::new(StubChain::new(vec![10]));
		let queue = start_queue(ConfigBuilder::new(), &chain);

		let players: Vec<String> = (0..20).map(|i| format!("0xP{:02}", i)).collect();
		let tickets = futures::future::join_all(
			players
				.iter()
				.map(|player| queue.enqueue(player, Action::BreakBrick)),
		)
		.await;

		let mut settlements = Vec::new();
		for (index, ticket) in tickets.into_iter().enumerate() {
			let ticket = ticket.unwrap();
			assert_eq!(ticket.id(), index as u64 + 1);
			settlements.push(ticket.await.unwrap());
		}

		let expected: Vec<String> = players.iter().map(|p| format!("breakBrick:{}", p)).collect();
		assert_eq!(chain.submitted_data(), expected);
		assert_eq!(chain.submitted_nonces(), (10..30).collect::<Vec<u64>>());
		for settlement in settlements {
			assert_eq!(settlement.tx_hash, hash_for(9 + settlement.id));
		}
		assert!(!chain.overlapped());
	}

	#[tokio::test]
	async fn test_record_visible_as_pending_after_enqueue() {
		let chain = Arc::new(StubChain::new(vec![0]).gated());
		let queue = start_queue(ConfigBuilder::new(), &chain);

		let ticket = queue.enqueue("0xAAA", Action::BreakBrick).await.unwrap();
		let record = queue.storage().get(ticket.id()).await.unwrap().unwrap();
		assert_eq!(record.status, TransactionStatus::Pending);
		assert_eq!(record.tx_hash, None);

		chain.release(1);
		ticket.await.unwrap();
		let record = queue.storage().get(1).await.unwrap().unwrap();
		assert_eq!(record.status, TransactionStatus::Completed);
	}

	#[tokio::test]
	async fn test_observability_while_executing() {
		let chain = Arc::new(StubChain::new(vec![0]).gated());
		let queue = start_queue(ConfigBuilder::new(), &chain);
		assert_eq!(queue.pending_len(), 0);
		assert!(!queue.is_executing());

		let first = queue.enqueue("0xAAA", Action::BreakBrick).await.unwrap();
		let second = queue.enqueue("0xBBB", Action::BreakBrick).await.unwrap();

		while chain.submitted_nonces().is_empty() {
			tokio::task::yield_now().await;
		}
		assert!(queue.is_executing());
		assert_eq!(queue.pending_len(), 1);

		chain.release(2);
		first.await.unwrap();
		second.await.unwrap();
		assert_eq!(queue.pending_len(), 0);
		assert!(!queue.is_executing());
	}

	#[tokio::test]
	async fn test_idle_queue_makes_no_chain_calls() {
		let chain = Arc::new(StubChain::new(vec![0]));
		let _queue = start_queue(ConfigBuilder::new(), &chain);

		tokio::time::sleep(Duration::from_millis(20)).await;
		assert!(chain.calls().is_empty());
	}

	#[tokio::test]
	async fn test_empty_player_rejected_without_record() {
		let chain = Arc::new(StubChain::new(vec![0]));
		let queue = start_queue(ConfigBuilder::new(), &chain);

		let err = queue.submit("", Action::BreakBrick).await.unwrap_err();
		assert!(matches!(err, RelayError::Validation(_)));
		assert!(queue.storage().list().await.unwrap().is_empty());
		assert!(chain.calls().is_empty());
	}

	#[tokio::test]
	async fn test_missing_contract_fails_record_without_chain_calls() {
		let chain = Arc::new(StubChain::new(vec![0]));
		let queue = start_queue(ConfigBuilder::new().contract_address(None), &chain);

		let err = queue.submit("0xAAA", Action::BreakBrick).await.unwrap_err();
		assert!(matches!(err, RelayError::Configuration(_)));

		let records = queue.storage().list().await.unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].status, TransactionStatus::Failed);
		assert!(chain.calls().is_empty());
	}

	#[tokio::test]
	async fn test_failure_does_not_block_later_items() {
		let chain = Arc::new(StubChain::new(vec![3, 3]));
		chain.fail_submits(vec![ChainError::Rejected("execution reverted".into())]);
		let queue = start_queue(ConfigBuilder::new(), &chain);

		let first = queue.enqueue("0xAAA", Action::BreakBrick).await.unwrap();
		let second = queue.enqueue("0xAAA", Action::BreakBrick).await.unwrap();

		assert_eq!(
			first.await,
			Err(RelayError::Chain("execution reverted".to_string()))
		);
		assert_eq!(second.await.unwrap().tx_hash, hash_for(3));

		let summary = queue.storage().summary().await.unwrap();
		assert_eq!(summary.failed, 1);
		assert_eq!(summary.completed, 1);
		assert_eq!(chain.submitted_nonces(), vec![3, 3]);
	}

	#[tokio::test]
	async fn test_retry_settles_caller_once() {
		let chain = Arc::new(StubChain::new(vec![5, 7]));
		chain.fail_submits(vec![ChainError::NonceTooLow("nonce too low".into())]);
		let queue = start_queue(ConfigBuilder::new(), &chain);

		let receipt = queue.submit("0xAAA", Action::BreakBrick).await.unwrap();
		assert_eq!(receipt.tx_hash, hash_for(7));
		assert_eq!(chain.submitted_nonces(), vec![5, 7]);

		let records = queue.storage().list().await.unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].status, TransactionStatus::Completed);
	}

	#[tokio::test]
	async fn test_dropped_ticket_does_not_stall_queue() {
		let chain = Arc::new(StubChain::new(vec![0]));
		let queue = start_queue(ConfigBuilder::new(), &chain);

		drop(queue.enqueue("0xAAA", Action::BreakBrick).await.unwrap());
		let receipt = queue.submit("0xBBB", Action::BreakBrick).await.unwrap();
		assert_eq!(receipt.id, 2);

		let summary = queue.storage().summary().await.unwrap();
		assert_eq!(summary.completed, 2);
	}
}
