//! Secure token type for sensitive strings.
//!
//! This module provides [`SecretToken`], a wrapper around sensitive string
//! data (auth tokens, passwords) that zeroes its memory on drop and is never
//! exposed in logs or debug output.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// An opaque secret that redacts itself in `Debug` and `Display` output.
///
/// Serialization exposes the inner value so the session store can persist
/// the auth token; it must only ever be serialized into local storage or an
/// authenticated request, never into log output.
#[derive(Clone)]
pub struct SecretToken(Zeroizing<String>);

impl SecretToken {
	/// Creates a new SecretToken from a regular string.
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret as a string slice.
	///
	/// Use only at the point the value actually leaves the process (request
	/// header, persisted session record).
	pub fn expose(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretToken(***REDACTED***)")
	}
}

impl fmt::Display for SecretToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "***REDACTED***")
	}
}

impl From<String> for SecretToken {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretToken {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl PartialEq for SecretToken {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for SecretToken {}

impl Serialize for SecretToken {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for SecretToken {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		Ok(SecretToken::new(s))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_output_is_redacted() {
		let token = SecretToken::from("super-secret");
		assert_eq!(format!("{:?}", token), "SecretToken(***REDACTED***)");
		assert_eq!(format!("{}", token), "***REDACTED***");
	}

	#[test]
	fn serde_round_trip_preserves_value() {
		let token = SecretToken::from("tok-123");
		let json = serde_json::to_string(&token).unwrap();
		assert_eq!(json, r#""tok-123""#);
		let back: SecretToken = serde_json::from_str(&json).unwrap();
		assert_eq!(back, token);
	}
}
