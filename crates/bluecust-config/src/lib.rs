//! Configuration module for the BlueCust client core.
//!
//! This module provides structures and utilities for managing client
//! configuration. It supports loading configuration from TOML files with
//! `${ENV_VAR}` / `${ENV_VAR:-default}` substitution and validates that all
//! required values are properly set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the BlueCust client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this client instance.
	pub client: ClientConfig,
	/// Fixed, process-wide pricing. Never user-editable.
	#[serde(default)]
	pub pricing: PricingConfig,
	/// Configuration for the remote data store client.
	pub backend: BackendConfig,
	/// Configuration for durable session storage.
	pub session: SessionConfig,
}

/// Configuration specific to the client instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Identifier for this client instance, used in log output.
	pub id: String,
}

/// Fixed pricing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Price of a single bottle in currency units.
	#[serde(default = "default_unit_rate")]
	pub unit_rate: u64,
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			unit_rate: default_unit_rate(),
		}
	}
}

/// Returns the default per-bottle rate of 16 currency units.
fn default_unit_rate() -> u64 {
	16
}

/// Configuration for the remote data store client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of backend implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for durable session storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Which storage implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment
	/// variables before parsing.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates cross-references the type system cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client.id.trim().is_empty() {
			return Err(ConfigError::Validation("client.id must not be empty".into()));
		}
		if self.pricing.unit_rate == 0 {
			return Err(ConfigError::Validation(
				"pricing.unit_rate must be at least 1".into(),
			));
		}
		if !self
			.backend
			.implementations
			.contains_key(&self.backend.primary)
		{
			return Err(ConfigError::Validation(format!(
				"backend.primary '{}' has no matching implementation section",
				self.backend.primary
			)));
		}
		if !self
			.session
			.implementations
			.contains_key(&self.session.primary)
		{
			return Err(ConfigError::Validation(format!(
				"session.primary '{}' has no matching implementation section",
				self.session.primary
			)));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Substitutes `${VAR}` and `${VAR:-default}` patterns with environment
/// variable values. A reference without a default to a variable that is not
/// set is a validation error.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Bound the input so a pathological file cannot stall the regex
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).expect("regex always has a full match");
		let var_name = cap.get(1).expect("group 1 is not optional").as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			}
		};

		replacements.push((full_match.as_str().to_string(), value));
	}

	for (pattern, value) in replacements {
		result = result.replace(&pattern, &value);
	}

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXAMPLE: &str = r#"
		[client]
		id = "bluecust-test"

		[backend]
		primary = "memory"
		[backend.implementations.memory]

		[session]
		primary = "memory"
		[session.implementations.memory]
	"#;

	#[test]
	fn test_unit_rate_defaults_to_sixteen() {
		let config: Config = EXAMPLE.parse().unwrap();
		assert_eq!(config.pricing.unit_rate, 16);
	}

	#[test]
	fn test_from_file_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, EXAMPLE).unwrap();
		let config = Config::from_file(&path).unwrap();
		assert_eq!(config.client.id, "bluecust-test");
		assert_eq!(config.backend.primary, "memory");
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("BLUECUST_TEST_URL", "http://localhost:8000/api");
		let input = "api_url = \"${BLUECUST_TEST_URL}\"";
		let resolved = resolve_env_vars(input).unwrap();
		assert_eq!(resolved, "api_url = \"http://localhost:8000/api\"");
	}

	#[test]
	fn test_env_var_default_applies_when_unset() {
		let input = "api_url = \"${BLUECUST_UNSET_VAR:-http://fallback}\"";
		let resolved = resolve_env_vars(input).unwrap();
		assert_eq!(resolved, "api_url = \"http://fallback\"");
	}

	#[test]
	fn test_missing_env_var_without_default_fails() {
		let input = "api_url = \"${BLUECUST_DEFINITELY_UNSET}\"";
		assert!(matches!(
			resolve_env_vars(input),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_primary_must_reference_an_implementation() {
		let bad = r#"
			[client]
			id = "bluecust-test"

			[backend]
			primary = "remote"
			[backend.implementations.memory]

			[session]
			primary = "memory"
			[session.implementations.memory]
		"#;
		assert!(matches!(
			bad.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_zero_unit_rate_is_rejected() {
		let bad = r#"
			[client]
			id = "bluecust-test"

			[pricing]
			unit_rate = 0

			[backend]
			primary = "memory"
			[backend.implementations.memory]

			[session]
			primary = "memory"
			[session.implementations.memory]
		"#;
		assert!(matches!(
			bad.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}
}
