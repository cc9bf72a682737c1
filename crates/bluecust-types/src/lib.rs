//! Common types module for the BlueCust client core.
//!
//! This module defines the core data types and structures shared by the
//! session store, lifecycle engines, directory service, and backend client.
//! It provides a centralized location for shared types to ensure consistency
//! across all components.

/// Authentication request/response types exchanged with the backend.
pub mod auth;
/// Supplier directory record types.
pub mod directory;
/// Customer order types and the fulfillment status space.
pub mod order;
/// Authenticated identity types.
pub mod principal;
/// Manufacturing production request types and derived statistics.
pub mod production;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Capability view resolution for principals.
pub mod role;
/// Secure token type for opaque auth tokens.
pub mod secret_token;

// Re-export all types for convenient access
pub use auth::*;
pub use directory::*;
pub use order::*;
pub use principal::*;
pub use production::*;
pub use registry::ImplementationRegistry;
pub use role::Role;
pub use secret_token::SecretToken;
