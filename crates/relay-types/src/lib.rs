//! Common types module for the game relayer.
//!
//! This module defines the data types shared by every relayer crate: the game
//! actions players can request, the transaction history records, chain-facing
//! call and hash types, and the HTTP API request/response shapes.

/// Game actions the relayer can submit on behalf of a player.
pub mod action;
/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Transaction delivery types for blockchain interactions.
pub mod delivery;
/// Transaction history records and their lifecycle states.
pub mod record;
/// Redacting wrapper for sensitive strings such as the relayer key.
pub mod secret_string;
/// Utility functions for common formatting and time helpers.
pub mod utils;

pub use action::{Action, ActionParseError};
pub use api::*;
pub use delivery::*;
pub use record::*;
pub use secret_string::SecretString;
pub use utils::{current_timestamp, truncate_id, with_0x_prefix, without_0x_prefix};
