//! Builder pattern for constructing the core engine.
//!
//! Composes a CoreEngine from pluggable backend and session storage
//! implementations using factory functions keyed by the names in the
//! configuration file.

use crate::CoreEngine;
use bluecust_backend::{BackendError, BackendInterface};
use bluecust_config::Config;
use bluecust_session::SessionStore;
use bluecust_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during core engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Container for the factory functions needed to build a CoreEngine.
///
/// Each factory takes the TOML value of its implementation section from the
/// configuration and returns the corresponding component.
pub struct CoreFactories<BF, SF> {
	pub backend_factories: HashMap<String, BF>,
	pub storage_factories: HashMap<String, SF>,
}

/// Builder for constructing a CoreEngine with pluggable implementations.
pub struct CoreBuilder {
	config: Config,
}

impl CoreBuilder {
	/// Creates a new CoreBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the CoreEngine using factories for each component type.
	pub fn build<BF, SF>(
		self,
		factories: CoreFactories<BF, SF>,
	) -> Result<CoreEngine, BuilderError>
	where
		BF: Fn(&toml::Value) -> Result<Box<dyn BackendInterface>, BackendError>,
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		// Session storage first; a backend is useless without a place to
		// keep the session it authenticates.
		let primary_storage = &self.config.session.primary;
		let storage_config = self
			.config
			.session
			.implementations
			.get(primary_storage)
			.ok_or_else(|| {
				BuilderError::MissingComponent(format!(
					"session storage implementation '{}'",
					primary_storage
				))
			})?;
		let storage_factory = factories
			.storage_factories
			.get(primary_storage)
			.ok_or_else(|| {
				BuilderError::MissingComponent(format!(
					"session storage factory '{}'",
					primary_storage
				))
			})?;
		let storage = storage_factory(storage_config).map_err(|e| {
			BuilderError::Config(format!(
				"Failed to create session storage '{}': {}",
				primary_storage, e
			))
		})?;
		tracing::info!(component = "session_storage", implementation = %primary_storage, "Loaded");

		let primary_backend = &self.config.backend.primary;
		let backend_config = self
			.config
			.backend
			.implementations
			.get(primary_backend)
			.ok_or_else(|| {
				BuilderError::MissingComponent(format!(
					"backend implementation '{}'",
					primary_backend
				))
			})?;
		let backend_factory = factories
			.backend_factories
			.get(primary_backend)
			.ok_or_else(|| {
				BuilderError::MissingComponent(format!("backend factory '{}'", primary_backend))
			})?;
		let backend = backend_factory(backend_config).map_err(|e| {
			BuilderError::Config(format!(
				"Failed to create backend '{}': {}",
				primary_backend, e
			))
		})?;
		tracing::info!(component = "backend", implementation = %primary_backend, "Loaded");

		let session = Arc::new(SessionStore::new(Arc::new(StorageService::new(storage))));
		let backend: Arc<dyn BackendInterface> = Arc::from(backend);

		Ok(CoreEngine::new(self.config, backend, session))
	}
}
