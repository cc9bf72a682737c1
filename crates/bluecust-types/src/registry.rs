//! Registry trait for self-registering implementations.
//!
//! Pluggable modules (local storage backends, data-store clients) each
//! provide a `Registry` struct implementing this trait, declaring the name
//! they are referenced by in configuration and the factory that builds them.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// for example "file" for `session.implementations.file` or "remote" for
	/// `backend.implementations.remote`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory that creates instances of this implementation
	/// from its configuration section.
	fn factory() -> Self::Factory;
}
