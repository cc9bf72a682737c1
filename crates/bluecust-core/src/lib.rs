//! Core engine for the BlueCust client.
//!
//! This module provides the role-gated decision logic of the platform: the
//! order fulfillment lifecycle, the manufacturing production lifecycle, and
//! the administrator's supplier directory, coordinated with the session
//! store and the remote data store. Everything here follows one rule: no
//! state is considered applied until the backing store confirms it.

use bluecust_backend::{BackendError, BackendInterface};
use bluecust_config::Config;
use bluecust_session::{SessionError, SessionStore};
use bluecust_types::{AuthResponse, Credentials, Principal, RegisterRequest, Role};
use std::sync::Arc;
use thiserror::Error;

pub mod builder;
pub mod directory;
pub mod state;

pub use builder::{BuilderError, CoreBuilder, CoreFactories};
pub use directory::DirectoryService;
pub use state::order::OrderLifecycle;
pub use state::production::ProductionLifecycle;

/// Utility function to truncate an id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer ids.
pub(crate) fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

/// Errors surfaced by the lifecycle engines and directory service.
///
/// Every error maps to a single human-readable line for the presentation
/// layer; each is traced before it propagates, since order status and totals
/// are the system's source of truth for external business operations.
#[derive(Debug, Error)]
pub enum CoreError {
	/// Missing or malformed input. Recoverable by correcting the input.
	#[error("Validation error: {0}")]
	Validation(String),
	/// The acting capability view lacks the requested capability. Never
	/// downgraded to a no-op.
	#[error("Authorization error: the {role} view may not {action}")]
	Authorization { role: Role, action: String },
	/// The referenced entity does not exist.
	#[error("Not found: {0}")]
	NotFound(String),
	/// The requested transition is not reachable from the current state.
	/// The entity is left exactly as it was.
	#[error("Invalid transition from {from} to {to}")]
	StateTransition { from: String, to: String },
	/// The backing store was unreachable or returned failure. Retried only
	/// at the caller's discretion, never inside the engines.
	#[error("Backend error: {0}")]
	Remote(#[from] BackendError),
	/// The session store failed or the caller is not authenticated.
	#[error("Session error: {0}")]
	Session(#[from] SessionError),
}

impl CoreError {
	/// Builds a [`CoreError::Authorization`] error, tracing it first.
	fn unauthorized(role: Role, action: impl Into<String>) -> Self {
		let action = action.into();
		tracing::warn!(role = %role, action = %action, "Capability check failed");
		CoreError::Authorization { role, action }
	}

	/// Builds a [`CoreError::Validation`] error, tracing it first.
	fn invalid(message: impl Into<String>) -> Self {
		let message = message.into();
		tracing::warn!(reason = %message, "Input rejected");
		CoreError::Validation(message)
	}
}

/// Maps a backend miss for a specific entity onto [`CoreError::NotFound`].
pub(crate) fn entity_error(id: &str) -> impl FnOnce(BackendError) -> CoreError + '_ {
	move |e| match e {
		BackendError::NotFound => {
			tracing::warn!(entity_id = %truncate_id(id), "Referenced entity does not exist");
			CoreError::NotFound(id.to_string())
		}
		other => CoreError::Remote(other),
	}
}

/// Main engine coordinating session, lifecycles, and directory.
///
/// The engine owns no entity state of its own: orders, production requests,
/// and directory records live in the backing store, the principal lives in
/// the session store. A failed call therefore never leaves anything half
/// applied on this side.
pub struct CoreEngine {
	config: Config,
	backend: Arc<dyn BackendInterface>,
	session: Arc<SessionStore>,
	orders: OrderLifecycle,
	production: ProductionLifecycle,
	directory: DirectoryService,
}

impl CoreEngine {
	pub fn new(
		config: Config,
		backend: Arc<dyn BackendInterface>,
		session: Arc<SessionStore>,
	) -> Self {
		let orders = OrderLifecycle::new(Arc::clone(&backend), config.pricing.unit_rate);
		let production = ProductionLifecycle::new(Arc::clone(&backend));
		let directory = DirectoryService::new(Arc::clone(&backend));
		Self {
			config,
			backend,
			session,
			orders,
			production,
			directory,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn session(&self) -> &SessionStore {
		&self.session
	}

	pub fn orders(&self) -> &OrderLifecycle {
		&self.orders
	}

	pub fn production(&self) -> &ProductionLifecycle {
		&self.production
	}

	pub fn directory(&self) -> &DirectoryService {
		&self.directory
	}

	/// Restores a persisted session and re-arms the backend client with its
	/// token. Called once at process start.
	pub async fn restore_session(&self) -> Result<Option<Principal>, CoreError> {
		let principal = self.session.restore().await?;
		if principal.is_some() {
			self.backend.set_auth(self.session.token().await);
		}
		Ok(principal)
	}

	/// Registers a new account and opens a session for it.
	pub async fn register(&self, request: &RegisterRequest) -> Result<Principal, CoreError> {
		let response = self.backend.register(request).await?;
		self.open_session(response).await
	}

	/// Logs into an existing account and opens a session for it.
	pub async fn login(&self, credentials: &Credentials) -> Result<Principal, CoreError> {
		let response = self.backend.login(credentials).await?;
		self.open_session(response).await
	}

	/// Closes the session and clears the backend client's token. Idempotent.
	pub async fn logout(&self) -> Result<(), CoreError> {
		self.session.logout().await?;
		self.backend.set_auth(None);
		Ok(())
	}

	async fn open_session(&self, response: AuthResponse) -> Result<Principal, CoreError> {
		let principal = response.user.clone();
		self.session
			.login(response.token.clone(), response.user)
			.await?;
		self.backend.set_auth(Some(response.token));
		tracing::info!(
			email = %principal.email,
			role = %Role::resolve(&principal),
			"Session opened"
		);
		Ok(principal)
	}
}
