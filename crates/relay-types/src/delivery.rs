//! Transaction delivery types for the relayer.
//!
//! This module defines the chain-facing values that flow between the core
//! queue and a chain client: the encoded contract call and the resulting
//! transaction hash.

use crate::utils::with_0x_prefix;
use alloy_primitives::{Address, Bytes};
use std::fmt;

/// Blockchain transaction hash representation.
///
/// Stores transaction hashes as raw bytes so that chain clients are free to
/// return whatever hash encoding their network uses.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl TransactionHash {
	/// Returns the hash as a 0x-prefixed lowercase hex string.
	pub fn to_hex(&self) -> String {
		with_0x_prefix(&hex::encode(&self.0))
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

/// An ABI-encoded call against a deployed contract.
///
/// The nonce is deliberately not part of the call: it is assigned by the
/// relayer's nonce tracker at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
	/// Target contract address.
	pub to: Address,
	/// ABI-encoded calldata.
	pub data: Bytes,
}
