//! Backend client module for the BlueCust client core.
//!
//! This module provides the abstraction over the remote data store that owns
//! every Order, ProductionRequest, and SupplierRecord. The core never applies
//! a state change the backend has not confirmed: each call here is the single
//! suspension point of its operation, and the returned record is treated as
//! authoritative.
//!
//! Role-scoped read projections (a venture sees only its own orders, a
//! manufacturer only requests routed to it) are enforced inside the backend
//! implementations by query scope, never by client-side filtering of a
//! superset.

use async_trait::async_trait;
use bluecust_types::{
	AuthResponse, Credentials, ImplementationRegistry, NewSupplier, Order, OrderDraft,
	OrderStatus, ProductionDraft, ProductionRequest, ProductionStatus, RegisterRequest,
	SecretToken, SupplierRecord,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
	pub mod remote;
}

/// Errors that can occur when talking to the backing store.
#[derive(Debug, Error)]
pub enum BackendError {
	/// The referenced entity does not exist.
	#[error("Not found")]
	NotFound,
	/// The backend refused the request (validation failure, bad credentials,
	/// insufficient privilege). Carries the backend's own message.
	#[error("Rejected by backend: {0}")]
	Rejected(String),
	/// Request or response payload could not be (de)serialized.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The backend could not be reached or failed mid-request. Callers may
	/// retry at their own discretion; nothing in the core retries
	/// automatically, since replaying a transition risks duplicate effects.
	#[error("Backend unreachable: {0}")]
	Unreachable(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface to the remote data store.
///
/// All mutating calls return the stored record as the backend now sees it;
/// callers must use that copy and discard whatever they sent. Conflicting
/// writes are serialized by the store, later write wins.
#[async_trait]
pub trait BackendInterface: Send + Sync {
	/// Installs the auth token attached to subsequent privileged calls.
	/// `None` clears it (logout).
	fn set_auth(&self, token: Option<SecretToken>);

	// --- Authentication ---

	/// Creates an account and returns the opaque token plus principal.
	async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError>;

	/// Authenticates an existing account.
	async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, BackendError>;

	// --- Customer orders ---

	/// Creates an order for the given venture. The id and creation timestamp
	/// are issued by the store; the caller supplies the computed total.
	async fn create_order(
		&self,
		venture_email: &str,
		draft: &OrderDraft,
		total_amount: u64,
	) -> Result<Order, BackendError>;

	/// Venture-scoped order listing.
	async fn orders_for_venture(&self, venture_email: &str) -> Result<Vec<Order>, BackendError>;

	/// Privileged listing of every order on the platform.
	async fn all_orders(&self) -> Result<Vec<Order>, BackendError>;

	async fn get_order(&self, id: &str) -> Result<Order, BackendError>;

	/// Replaces the stored order with the given record.
	async fn update_order(&self, order: &Order) -> Result<Order, BackendError>;

	/// Applies a status change and returns the confirmed record.
	async fn patch_order_status(
		&self,
		id: &str,
		status: OrderStatus,
	) -> Result<Order, BackendError>;

	/// Fetches the rendered bill for an order as an opaque byte blob.
	/// Document generation happens behind the backend; the core only relays.
	async fn fetch_order_bill(&self, id: &str) -> Result<Vec<u8>, BackendError>;

	// --- Production requests ---

	async fn create_production_request(
		&self,
		draft: &ProductionDraft,
	) -> Result<ProductionRequest, BackendError>;

	/// Manufacturer-scoped request listing.
	async fn production_for_manufacturer(
		&self,
		manufacturer_email: &str,
	) -> Result<Vec<ProductionRequest>, BackendError>;

	/// Privileged listing of every production request.
	async fn all_production_requests(&self) -> Result<Vec<ProductionRequest>, BackendError>;

	async fn get_production_request(&self, id: &str)
		-> Result<ProductionRequest, BackendError>;

	/// Replaces the stored request with the given record.
	async fn update_production_request(
		&self,
		request: &ProductionRequest,
	) -> Result<ProductionRequest, BackendError>;

	/// Applies a production status change and returns the confirmed record.
	async fn patch_production_status(
		&self,
		id: &str,
		status: ProductionStatus,
	) -> Result<ProductionRequest, BackendError>;

	// --- Supplier directory ---

	async fn create_supplier(
		&self,
		supplier: &NewSupplier,
	) -> Result<SupplierRecord, BackendError>;

	async fn list_suppliers(&self) -> Result<Vec<SupplierRecord>, BackendError>;

	async fn delete_supplier(&self, id: &str) -> Result<(), BackendError>;
}

/// Type alias for backend factory functions.
pub type BackendFactory = fn(&toml::Value) -> Result<Box<dyn BackendInterface>, BackendError>;

/// Registry trait for backend implementations.
pub trait BackendRegistry: ImplementationRegistry<Factory = BackendFactory> {}

/// Get all registered backend implementations.
///
/// Returns a vector of (name, factory) tuples for all available backends.
pub fn get_all_implementations() -> Vec<(&'static str, BackendFactory)> {
	use implementations::{memory, remote};

	vec![
		(remote::Registry::NAME, remote::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}
