//! Hand-written chain and contract stubs shared by the core tests.

use crate::{ContractBinding, RelayError};
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use relay_delivery::{ChainClient, ChainClientFactory, ChainError};
use relay_types::{Action, ContractCall, TransactionHash};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// One observed call against the stub chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
	PendingNonce,
	Submit { nonce: u64, data: String },
}

/// Scripted chain client that records every call.
pub struct StubChain {
	address: Address,
	/// Successive pending-count answers; the last one repeats.
	pending: Mutex<VecDeque<u64>>,
	nonce_error: Mutex<Option<ChainError>>,
	/// Successive submit outcomes; once drained every submit succeeds.
	outcomes: Mutex<VecDeque<ChainError>>,
	calls: Mutex<Vec<ChainCall>>,
	delay: Option<Duration>,
	gate: Option<Arc<Semaphore>>,
	in_flight: AtomicBool,
	overlapped: AtomicBool,
}

impl StubChain {
	pub fn new(pending: Vec<u64>) -> Self {
		Self {
			address: Address::repeat_byte(0x11),
			pending: Mutex::new(pending.into()),
			nonce_error: Mutex::new(None),
			outcomes: Mutex::new(VecDeque::new()),
			calls: Mutex::new(Vec::new()),
			delay: None,
			gate: None,
			in_flight: AtomicBool::new(false),
			overlapped: AtomicBool::new(false),
		}
	}

	/// Makes every submit sleep before answering.
	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	/// Makes every submit wait for a permit released through [`StubChain::release`].
	pub fn gated(mut self) -> Self {
		self.gate = Some(Arc::new(Semaphore::new(0)));
		self
	}

	pub fn release(&self, submissions: usize) {
		if let Some(gate) = &self.gate {
			gate.add_permits(submissions);
		}
	}

	/// Queues failures for the next submits, in order.
	pub fn fail_submits(&self, errors: Vec<ChainError>) {
		self.outcomes.lock().unwrap().extend(errors);
	}

	pub fn fail_nonce_queries(&self, error: ChainError) {
		*self.nonce_error.lock().unwrap() = Some(error);
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn calls(&self) -> Vec<ChainCall> {
		self.calls.lock().unwrap().clone()
	}

	pub fn submitted_nonces(&self) -> Vec<u64> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				ChainCall::Submit { nonce, .. } => Some(nonce),
				ChainCall::PendingNonce => None,
			})
			.collect()
	}

	pub fn submitted_data(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				ChainCall::Submit { data, .. } => Some(data),
				ChainCall::PendingNonce => None,
			})
			.collect()
	}

	/// True if two chain calls were ever in progress at the same time.
	pub fn overlapped(&self) -> bool {
		self.overlapped.load(Ordering::SeqCst)
	}

	fn enter(&self) {
		if self.in_flight.swap(true, Ordering::SeqCst) {
			self.overlapped.store(true, Ordering::SeqCst);
		}
	}

	fn leave(&self) {
		self.in_flight.store(false, Ordering::SeqCst);
	}
}

/// Hash the stub returns for a transaction sent with `nonce`.
pub fn hash_for(nonce: u64) -> TransactionHash {
	let mut bytes = vec![0u8; 32];
	bytes[24..].copy_from_slice(&nonce.to_be_bytes());
	TransactionHash(bytes)
}

#[async_trait]
impl ChainClient for StubChain {
	fn address(&self) -> Address {
		self.address
	}

	async fn pending_nonce(&self, _address: Address) -> Result<u64, ChainError> {
		self.enter();
		self.calls.lock().unwrap().push(ChainCall::PendingNonce);
		let result = match self.nonce_error.lock().unwrap().clone() {
			Some(err) => Err(err),
			None => {
				let mut pending = self.pending.lock().unwrap();
				if pending.len() > 1 {
					Ok(pending.pop_front().unwrap())
				} else {
					Ok(*pending.front().unwrap())
				}
			}
		};
		self.leave();
		result
	}

	async fn submit(&self, call: ContractCall, nonce: u64) -> Result<TransactionHash, ChainError> {
		self.enter();
		self.calls.lock().unwrap().push(ChainCall::Submit {
			nonce,
			data: String::from_utf8_lossy(&call.data).into_owned(),
		});

		if let Some(gate) = &self.gate {
			gate.acquire().await.unwrap().forget();
		}
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}
		tokio::task::yield_now().await;

		let outcome = self.outcomes.lock().unwrap().pop_front();
		self.leave();
		match outcome {
			Some(err) => Err(err),
			None => Ok(hash_for(nonce)),
		}
	}
}

/// Factory handing out the shared stub and counting how often it ran.
pub fn stub_factory(chain: &Arc<StubChain>) -> (ChainClientFactory, Arc<AtomicUsize>) {
	let builds = Arc::new(AtomicUsize::new(0));
	let counter = builds.clone();
	let chain = chain.clone();
	let factory: ChainClientFactory = Arc::new(move |_credentials| {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(chain.clone() as Arc<dyn ChainClient>)
	});
	(factory, builds)
}

/// Binding that encodes `action:player` as plain text, so any player string
/// is accepted and the submitted calldata stays readable in assertions.
pub struct StubBinding;

impl ContractBinding for StubBinding {
	fn encode(&self, action: Action, player: &str) -> Result<Bytes, RelayError> {
		Ok(Bytes::from(format!("{}:{}", action, player).into_bytes()))
	}
}
