//! Utility functions for formatting and time.

pub mod formatting;
pub mod helpers;

pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp;
