//! Remote REST backend implementation.
//!
//! Talks to the hosted BlueCust API over HTTP with a pooled `reqwest`
//! client. The auth token installed by the session flow is attached as a
//! bearer header on every call. Failures map onto [`BackendError`]: 404 to
//! `NotFound`, other 4xx/5xx to `Rejected` with the server's `detail`
//! message, transport failures to `Unreachable`. Nothing here retries — a
//! replayed transition could apply twice.

use crate::{BackendError, BackendFactory, BackendInterface, BackendRegistry};
use async_trait::async_trait;
use bluecust_types::{
	AuthResponse, Credentials, ImplementationRegistry, NewSupplier, Order, OrderDraft,
	OrderStatus, ProductionDraft, ProductionRequest, ProductionStatus, RegisterRequest,
	SecretToken, SupplierRecord,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// HTTP client for the hosted BlueCust API.
pub struct RemoteBackend {
	client: reqwest::Client,
	/// Base URL including the `/api` prefix.
	base_url: String,
	/// Bearer token for privileged endpoints, installed after login.
	token: RwLock<Option<SecretToken>>,
}

/// Error body shape the API returns on failure.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
	detail: Option<String>,
}

/// Order creation payload. The total is computed client-side from the
/// configured unit rate and sent along for the server to record.
#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
	quantity: u32,
	sticker_text: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	sticker_design_notes: Option<&'a str>,
	payment_mode: bluecust_types::PaymentMode,
	total_amount: u64,
}

#[derive(Debug, Serialize)]
struct StatusPatch<S: Serialize> {
	status: S,
}

impl RemoteBackend {
	pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, BackendError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(std::time::Duration::from_secs(90))
			.pool_max_idle_per_host(10)
			.timeout(timeout)
			.build()
			.map_err(|e| BackendError::Configuration(e.to_string()))?;
		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
			token: RwLock::new(None),
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	/// Attaches the bearer token, if one is installed.
	fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
		let token = self.token.read().expect("token lock poisoned");
		match token.as_ref() {
			Some(token) => request.bearer_auth(token.expose()),
			None => request,
		}
	}

	async fn send(
		&self,
		request: reqwest::RequestBuilder,
	) -> Result<reqwest::Response, BackendError> {
		let response = self
			.authorize(request)
			.send()
			.await
			.map_err(|e| BackendError::Unreachable(e.to_string()))?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}
		if status == StatusCode::NOT_FOUND {
			return Err(BackendError::NotFound);
		}
		let detail = response
			.json::<ErrorDetail>()
			.await
			.ok()
			.and_then(|body| body.detail)
			.unwrap_or_else(|| format!("HTTP {}", status));
		tracing::warn!(status = %status, detail = %detail, "Backend rejected request");
		Err(BackendError::Rejected(detail))
	}

	async fn send_json<T: DeserializeOwned>(
		&self,
		request: reqwest::RequestBuilder,
	) -> Result<T, BackendError> {
		let response = self.send(request).await?;
		response
			.json::<T>()
			.await
			.map_err(|e| BackendError::Serialization(e.to_string()))
	}
}

#[async_trait]
impl BackendInterface for RemoteBackend {
	fn set_auth(&self, token: Option<SecretToken>) {
		let mut guard = self.token.write().expect("token lock poisoned");
		*guard = token;
	}

	async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError> {
		self.send_json(self.client.post(self.url("/auth/register")).json(request))
			.await
	}

	async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, BackendError> {
		self.send_json(self.client.post(self.url("/auth/login")).json(credentials))
			.await
	}

	async fn create_order(
		&self,
		venture_email: &str,
		draft: &OrderDraft,
		total_amount: u64,
	) -> Result<Order, BackendError> {
		let body = CreateOrderBody {
			quantity: draft.quantity,
			sticker_text: &draft.sticker_text,
			sticker_design_notes: draft.sticker_design_notes.as_deref(),
			payment_mode: draft.payment_mode,
			total_amount,
		};
		self.send_json(
			self.client
				.post(self.url("/orders"))
				.query(&[("user_email", venture_email)])
				.json(&body),
		)
		.await
	}

	async fn orders_for_venture(&self, venture_email: &str) -> Result<Vec<Order>, BackendError> {
		self.send_json(
			self.client
				.get(self.url(&format!("/orders/user/{}", venture_email))),
		)
		.await
	}

	async fn all_orders(&self) -> Result<Vec<Order>, BackendError> {
		self.send_json(self.client.get(self.url("/orders"))).await
	}

	async fn get_order(&self, id: &str) -> Result<Order, BackendError> {
		self.send_json(self.client.get(self.url(&format!("/orders/{}", id))))
			.await
	}

	async fn update_order(&self, order: &Order) -> Result<Order, BackendError> {
		self.send_json(
			self.client
				.put(self.url(&format!("/orders/{}", order.id)))
				.json(order),
		)
		.await
	}

	async fn patch_order_status(
		&self,
		id: &str,
		status: OrderStatus,
	) -> Result<Order, BackendError> {
		self.send_json(
			self.client
				.patch(self.url(&format!("/orders/{}/status", id)))
				.json(&StatusPatch { status }),
		)
		.await
	}

	async fn fetch_order_bill(&self, id: &str) -> Result<Vec<u8>, BackendError> {
		let response = self
			.send(self.client.get(self.url(&format!("/orders/{}/pdf", id))))
			.await?;
		let bytes = response
			.bytes()
			.await
			.map_err(|e| BackendError::Unreachable(e.to_string()))?;
		Ok(bytes.to_vec())
	}

	async fn create_production_request(
		&self,
		draft: &ProductionDraft,
	) -> Result<ProductionRequest, BackendError> {
		self.send_json(self.client.post(self.url("/production")).json(draft))
			.await
	}

	async fn production_for_manufacturer(
		&self,
		manufacturer_email: &str,
	) -> Result<Vec<ProductionRequest>, BackendError> {
		self.send_json(
			self.client
				.get(self.url(&format!("/production/manufacturer/{}", manufacturer_email))),
		)
		.await
	}

	async fn all_production_requests(&self) -> Result<Vec<ProductionRequest>, BackendError> {
		self.send_json(self.client.get(self.url("/production"))).await
	}

	async fn get_production_request(
		&self,
		id: &str,
	) -> Result<ProductionRequest, BackendError> {
		self.send_json(self.client.get(self.url(&format!("/production/{}", id))))
			.await
	}

	async fn update_production_request(
		&self,
		request: &ProductionRequest,
	) -> Result<ProductionRequest, BackendError> {
		self.send_json(
			self.client
				.put(self.url(&format!("/production/{}", request.id)))
				.json(request),
		)
		.await
	}

	async fn patch_production_status(
		&self,
		id: &str,
		status: ProductionStatus,
	) -> Result<ProductionRequest, BackendError> {
		self.send_json(
			self.client
				.patch(self.url(&format!("/production/{}/status", id)))
				.json(&StatusPatch { status }),
		)
		.await
	}

	async fn create_supplier(
		&self,
		supplier: &NewSupplier,
	) -> Result<SupplierRecord, BackendError> {
		self.send_json(self.client.post(self.url("/admin/suppliers")).json(supplier))
			.await
	}

	async fn list_suppliers(&self) -> Result<Vec<SupplierRecord>, BackendError> {
		self.send_json(self.client.get(self.url("/admin/suppliers")))
			.await
	}

	async fn delete_supplier(&self, id: &str) -> Result<(), BackendError> {
		self.send(self.client.delete(self.url(&format!("/admin/suppliers/{}", id))))
			.await
			.map(|_| ())
	}
}

/// Registry for the remote REST backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "remote";
	type Factory = BackendFactory;

	fn factory() -> Self::Factory {
		create_backend
	}
}

impl BackendRegistry for Registry {}

/// Factory function to create a remote backend from configuration.
///
/// Configuration parameters:
/// - `api_url` (required): base URL of the API, including the `/api` prefix.
/// - `timeout_seconds` (optional): request timeout, default 30.
pub fn create_backend(config: &toml::Value) -> Result<Box<dyn BackendInterface>, BackendError> {
	let api_url = config
		.get("api_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| BackendError::Configuration("remote backend requires 'api_url'".into()))?;
	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.unwrap_or(30) as u64;
	let backend = RemoteBackend::new(
		api_url.to_string(),
		std::time::Duration::from_secs(timeout_seconds),
	)?;
	Ok(Box::new(backend))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_factory_requires_api_url() {
		let config: toml::Value = toml::from_str("timeout_seconds = 5").unwrap();
		assert!(matches!(
			create_backend(&config),
			Err(BackendError::Configuration(_))
		));
	}

	#[test]
	fn test_base_url_trailing_slash_is_normalized() {
		let backend = RemoteBackend::new(
			"http://localhost:8000/api/".into(),
			std::time::Duration::from_secs(5),
		)
		.unwrap();
		assert_eq!(backend.url("/orders"), "http://localhost:8000/api/orders");
	}
}
