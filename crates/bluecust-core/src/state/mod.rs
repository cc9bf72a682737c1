//! Lifecycle state machines for orders and production requests.

pub mod order;
pub mod production;
