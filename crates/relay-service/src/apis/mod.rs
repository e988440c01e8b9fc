//! Request handlers behind the HTTP routes.

pub mod relay;
pub mod transactions;
