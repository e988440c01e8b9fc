//! Contract binding for the breakout game.
//!
//! Encodes each supported [`Action`] as calldata. The target address is not
//! part of the binding; the executor pairs the calldata with the configured
//! contract address.

use crate::RelayError;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use relay_types::Action;

sol! {
	interface IBreakoutGame {
		function breakBrick() external;
		function startGame(address player) external;
	}
}

/// Encodes game actions into contract calldata.
pub trait ContractBinding: Send + Sync {
	/// Encodes `action` performed for `player`.
	fn encode(&self, action: Action, player: &str) -> Result<Bytes, RelayError>;
}

/// ABI binding for the deployed BreakoutGame contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakoutGame;

impl ContractBinding for BreakoutGame {
	fn encode(&self, action: Action, player: &str) -> Result<Bytes, RelayError> {
		let data = match action {
			Action::BreakBrick => IBreakoutGame::breakBrickCall {}.abi_encode(),
			Action::StartGame => {
				let player: Address = player.trim().parse().map_err(|e| {
					RelayError::Encoding(format!("Invalid player address {}: {}", player, e))
				})?;
				IBreakoutGame::startGameCall { player }.abi_encode()
			}
		};
		Ok(data.into())
	}
}
