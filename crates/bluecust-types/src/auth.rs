//! Authentication request and response types.
//!
//! These mirror the backend's `/auth/register` and `/auth/login` payloads.
//! The token in a successful response is opaque: the client stores and
//! relays it, nothing more.

use crate::principal::{BusinessType, Principal};
use crate::secret_token::SecretToken;
use serde::{Deserialize, Serialize};

/// Payload for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
	pub email: String,
	pub password: SecretToken,
	pub contact_number: String,
	pub business_name: String,
	pub business_type: BusinessType,
}

/// Payload for logging into an existing account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
	pub email: String,
	pub password: SecretToken,
}

/// Successful authentication: an opaque token plus the principal it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
	pub token: SecretToken,
	pub user: Principal,
}
