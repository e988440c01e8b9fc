//! Game action types.
//!
//! An [`Action`] names one of the contract operations a player may ask the
//! relayer to perform. The wire form is the camelCase contract function name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported game operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
	/// Records a broken brick for the player (`breakBrick()`).
	BreakBrick,
	/// Starts a new game for the player (`startGame(address)`).
	StartGame,
}

/// Error returned when an action name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid action: {0}")]
pub struct ActionParseError(pub String);

impl Action {
	/// Returns the wire name of the action.
	pub fn as_str(&self) -> &'static str {
		match self {
			Action::BreakBrick => "breakBrick",
			Action::StartGame => "startGame",
		}
	}

	/// Returns an iterator over all supported actions.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::BreakBrick, Self::StartGame].into_iter()
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Action {
	type Err = ActionParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"breakBrick" => Ok(Self::BreakBrick),
			"startGame" => Ok(Self::StartGame),
			other => Err(ActionParseError(other.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_action_names_round_trip_through_from_str() {
		for action in Action::all() {
			assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
		}
	}

	#[test]
	fn test_unknown_action_rejected() {
		let err = "jump".parse::<Action>().unwrap_err();
		assert_eq!(err.to_string(), "Invalid action: jump");
		assert!("BreakBrick".parse::<Action>().is_err());
	}

	#[test]
	fn test_action_serializes_as_camel_case() {
		assert_eq!(
			serde_json::to_string(&Action::StartGame).unwrap(),
			"\"startGame\""
		);
		let parsed: Action = serde_json::from_str("\"breakBrick\"").unwrap();
		assert_eq!(parsed, Action::BreakBrick);
	}
}
