//! Session store for the BlueCust client core.
//!
//! Holds at most one authenticated [`Principal`] for the life of the client
//! process and carries it across restarts through durable local storage.
//! The store is an explicitly owned, dependency-injected object with an
//! explicit lifecycle: [`SessionStore::restore`] at startup,
//! [`SessionStore::logout`] at teardown. No component reads it ambiently.
//!
//! The principal is owned here exclusively; every other component receives
//! it by value or reference and never mutates it.

use bluecust_storage::{StorageError, StorageService};
use bluecust_types::{Principal, SecretToken};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Namespace under which the session record is persisted.
const SESSION_NAMESPACE: &str = "session";
/// There is only ever one session per process.
const SESSION_ID: &str = "current";

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
	/// A capability requiring a principal was invoked while logged out.
	/// This is the caller's contract violation; the routing layer is
	/// responsible for redirecting to login.
	#[error("Not authenticated")]
	Unauthenticated,
	/// Durable storage failed underneath the session store.
	#[error("Session storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for SessionError {
	fn from(err: StorageError) -> Self {
		SessionError::Storage(err.to_string())
	}
}

/// The authenticated session: opaque token plus the principal it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
	pub token: SecretToken,
	pub principal: Principal,
}

/// Holds the current session and mirrors it into durable storage.
pub struct SessionStore {
	storage: Arc<StorageService>,
	current: RwLock<Option<Session>>,
}

impl SessionStore {
	/// Creates a store with no active session. Call [`restore`] to pick up
	/// a persisted one.
	///
	/// [`restore`]: SessionStore::restore
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			current: RwLock::new(None),
		}
	}

	/// Restores a persisted session from durable storage, if one exists.
	///
	/// Absence is not an error: the process simply starts unauthenticated.
	/// Returns the restored principal for the caller's logging.
	pub async fn restore(&self) -> Result<Option<Principal>, SessionError> {
		match self
			.storage
			.retrieve::<Session>(SESSION_NAMESPACE, SESSION_ID)
			.await
		{
			Ok(session) => {
				let principal = session.principal.clone();
				let mut current = self.current.write().await;
				*current = Some(session);
				tracing::info!(email = %principal.email, "Restored session");
				Ok(Some(principal))
			}
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	/// Stores credentials and principal. Persists first, then publishes:
	/// a login the next restart cannot see never becomes visible here
	/// either.
	pub async fn login(
		&self,
		token: SecretToken,
		principal: Principal,
	) -> Result<(), SessionError> {
		let session = Session { token, principal };
		self.storage
			.store(SESSION_NAMESPACE, SESSION_ID, &session)
			.await?;
		let mut current = self.current.write().await;
		tracing::info!(email = %session.principal.email, "Logged in");
		*current = Some(session);
		Ok(())
	}

	/// Clears credentials and principal from memory and durable storage.
	/// Idempotent: logging out twice is not an error.
	pub async fn logout(&self) -> Result<(), SessionError> {
		self.storage.remove(SESSION_NAMESPACE, SESSION_ID).await?;
		let mut current = self.current.write().await;
		if current.take().is_some() {
			tracing::info!("Logged out");
		}
		Ok(())
	}

	/// Returns the stored principal, or `None` when unauthenticated.
	/// Protected views must query this on every use, never assume it.
	pub async fn current_principal(&self) -> Option<Principal> {
		let current = self.current.read().await;
		current.as_ref().map(|s| s.principal.clone())
	}

	/// Returns the principal or reports the unauthenticated state for
	/// callers that require a login.
	pub async fn require_principal(&self) -> Result<Principal, SessionError> {
		self.current_principal()
			.await
			.ok_or(SessionError::Unauthenticated)
	}

	/// Returns the current auth token for the backend client.
	pub async fn token(&self) -> Option<SecretToken> {
		let current = self.current.read().await;
		current.as_ref().map(|s| s.token.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bluecust_storage::implementations::memory::MemoryStorage;
	use bluecust_types::BusinessType;

	fn store() -> SessionStore {
		SessionStore::new(Arc::new(StorageService::new(Box::new(
			MemoryStorage::new(),
		))))
	}

	fn principal() -> Principal {
		Principal {
			email: "cafe@example.com".into(),
			business_name: "Cafe X".into(),
			business_type: BusinessType::Cafe,
			is_admin: false,
		}
	}

	#[tokio::test]
	async fn test_login_exposes_principal_until_logout() {
		let store = store();
		assert!(store.current_principal().await.is_none());
		assert!(matches!(
			store.require_principal().await,
			Err(SessionError::Unauthenticated)
		));

		store
			.login(SecretToken::from("tok"), principal())
			.await
			.unwrap();
		assert_eq!(store.require_principal().await.unwrap(), principal());
		assert_eq!(store.token().await.unwrap(), SecretToken::from("tok"));

		store.logout().await.unwrap();
		assert!(store.current_principal().await.is_none());
		assert!(store.token().await.is_none());
	}

	#[tokio::test]
	async fn test_logout_is_idempotent() {
		let store = store();
		store.logout().await.unwrap();
		store
			.login(SecretToken::from("tok"), principal())
			.await
			.unwrap();
		store.logout().await.unwrap();
		store.logout().await.unwrap();
	}

	#[tokio::test]
	async fn test_session_survives_restart_via_shared_storage() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));

		let first = SessionStore::new(Arc::clone(&storage));
		first
			.login(SecretToken::from("tok"), principal())
			.await
			.unwrap();

		// A second store over the same storage plays the restarted process
		let second = SessionStore::new(Arc::clone(&storage));
		assert!(second.current_principal().await.is_none());
		let restored = second.restore().await.unwrap();
		assert_eq!(restored, Some(principal()));
		assert_eq!(second.token().await.unwrap(), SecretToken::from("tok"));
	}

	#[tokio::test]
	async fn test_restore_without_persisted_session_is_clean() {
		let store = store();
		assert_eq!(store.restore().await.unwrap(), None);
		assert!(store.current_principal().await.is_none());
	}
}
