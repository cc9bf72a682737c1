//! In-memory backend implementation.
//!
//! A self-contained data store keeping every entity in process memory. It
//! issues its own uuid identifiers and timestamps and enforces the same
//! role-scoped query projections the real backend does, which makes it the
//! reference store for tests and offline development.

use crate::{BackendError, BackendFactory, BackendInterface, BackendRegistry};
use async_trait::async_trait;
use bluecust_types::{
	AuthResponse, Credentials, ImplementationRegistry, NewSupplier, Order, OrderDraft,
	OrderStatus, Principal, ProductionDraft, ProductionRequest, ProductionStatus,
	RegisterRequest, SecretToken, SupplierRecord,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Stored account record: the principal plus its password.
#[derive(Clone)]
struct Account {
	principal: Principal,
	password: SecretToken,
}

/// In-memory data store.
pub struct MemoryBackend {
	accounts: Arc<RwLock<HashMap<String, Account>>>,
	orders: Arc<RwLock<HashMap<String, Order>>>,
	production: Arc<RwLock<HashMap<String, ProductionRequest>>>,
	suppliers: Arc<RwLock<HashMap<String, SupplierRecord>>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self {
			accounts: Arc::new(RwLock::new(HashMap::new())),
			orders: Arc::new(RwLock::new(HashMap::new())),
			production: Arc::new(RwLock::new(HashMap::new())),
			suppliers: Arc::new(RwLock::new(HashMap::new())),
		}
	}

	/// Seeds an account directly, bypassing registration. Lets tests and
	/// development setups create administrator principals, which the public
	/// register call never produces.
	pub async fn seed_account(&self, principal: Principal, password: SecretToken) {
		let mut accounts = self.accounts.write().await;
		accounts.insert(
			principal.email.clone(),
			Account {
				principal,
				password,
			},
		);
	}

	fn now() -> u64 {
		chrono::Utc::now().timestamp() as u64
	}
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl BackendInterface for MemoryBackend {
	fn set_auth(&self, _token: Option<SecretToken>) {
		// The in-memory store trusts its in-process callers
	}

	async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, BackendError> {
		let mut accounts = self.accounts.write().await;
		if accounts.contains_key(&request.email) {
			return Err(BackendError::Rejected(format!(
				"account already exists: {}",
				request.email
			)));
		}
		let principal = Principal {
			email: request.email.clone(),
			business_name: request.business_name.clone(),
			business_type: request.business_type,
			is_admin: false,
		};
		accounts.insert(
			request.email.clone(),
			Account {
				principal: principal.clone(),
				password: request.password.clone(),
			},
		);
		Ok(AuthResponse {
			token: SecretToken::new(Uuid::new_v4().to_string()),
			user: principal,
		})
	}

	async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, BackendError> {
		let accounts = self.accounts.read().await;
		let account = accounts
			.get(&credentials.email)
			.filter(|a| a.password == credentials.password)
			.ok_or_else(|| BackendError::Rejected("invalid email or password".into()))?;
		Ok(AuthResponse {
			token: SecretToken::new(Uuid::new_v4().to_string()),
			user: account.principal.clone(),
		})
	}

	async fn create_order(
		&self,
		venture_email: &str,
		draft: &OrderDraft,
		total_amount: u64,
	) -> Result<Order, BackendError> {
		let order = Order {
			id: Uuid::new_v4().to_string(),
			venture_email: venture_email.to_string(),
			quantity: draft.quantity,
			total_amount,
			sticker_text: draft.sticker_text.clone(),
			sticker_design_notes: draft.sticker_design_notes.clone(),
			payment_mode: draft.payment_mode,
			created_at: Self::now(),
			status: OrderStatus::Pending,
		};
		let mut orders = self.orders.write().await;
		orders.insert(order.id.clone(), order.clone());
		Ok(order)
	}

	async fn orders_for_venture(&self, venture_email: &str) -> Result<Vec<Order>, BackendError> {
		let orders = self.orders.read().await;
		// Scoped at the store: foreign orders never leave this map
		Ok(orders
			.values()
			.filter(|o| o.venture_email == venture_email)
			.cloned()
			.collect())
	}

	async fn all_orders(&self) -> Result<Vec<Order>, BackendError> {
		let orders = self.orders.read().await;
		Ok(orders.values().cloned().collect())
	}

	async fn get_order(&self, id: &str) -> Result<Order, BackendError> {
		let orders = self.orders.read().await;
		orders.get(id).cloned().ok_or(BackendError::NotFound)
	}

	async fn update_order(&self, order: &Order) -> Result<Order, BackendError> {
		let mut orders = self.orders.write().await;
		if !orders.contains_key(&order.id) {
			return Err(BackendError::NotFound);
		}
		orders.insert(order.id.clone(), order.clone());
		Ok(order.clone())
	}

	async fn patch_order_status(
		&self,
		id: &str,
		status: OrderStatus,
	) -> Result<Order, BackendError> {
		let mut orders = self.orders.write().await;
		let order = orders.get_mut(id).ok_or(BackendError::NotFound)?;
		// Writes are serialized by this lock; the later one wins
		order.status = status;
		Ok(order.clone())
	}

	async fn fetch_order_bill(&self, id: &str) -> Result<Vec<u8>, BackendError> {
		let orders = self.orders.read().await;
		let order = orders.get(id).ok_or(BackendError::NotFound)?;
		// Stand-in for the external document service: an opaque blob is all
		// the core ever sees
		Ok(format!(
			"BlueCust bill\norder: {}\nquantity: {}\ntotal: {}\n",
			order.id, order.quantity, order.total_amount
		)
		.into_bytes())
	}

	async fn create_production_request(
		&self,
		draft: &ProductionDraft,
	) -> Result<ProductionRequest, BackendError> {
		let request = ProductionRequest {
			id: Uuid::new_v4().to_string(),
			venture_email: draft.venture_email.clone(),
			venture_name: draft.venture_name.clone(),
			manufacturer_email: draft.manufacturer_email.clone(),
			quantity: draft.quantity,
			sticker_text: draft.sticker_text.clone(),
			sticker_design_notes: draft.sticker_design_notes.clone(),
			bottle_type: draft.bottle_type.clone(),
			label_type: draft.label_type.clone(),
			cap_color: draft.cap_color.clone(),
			special_requirements: draft.special_requirements.clone(),
			deadline: draft.deadline,
			created_at: Self::now(),
			status: ProductionStatus::Pending,
		};
		let mut production = self.production.write().await;
		production.insert(request.id.clone(), request.clone());
		Ok(request)
	}

	async fn production_for_manufacturer(
		&self,
		manufacturer_email: &str,
	) -> Result<Vec<ProductionRequest>, BackendError> {
		let production = self.production.read().await;
		Ok(production
			.values()
			.filter(|r| r.manufacturer_email == manufacturer_email)
			.cloned()
			.collect())
	}

	async fn all_production_requests(&self) -> Result<Vec<ProductionRequest>, BackendError> {
		let production = self.production.read().await;
		Ok(production.values().cloned().collect())
	}

	async fn get_production_request(
		&self,
		id: &str,
	) -> Result<ProductionRequest, BackendError> {
		let production = self.production.read().await;
		production.get(id).cloned().ok_or(BackendError::NotFound)
	}

	async fn update_production_request(
		&self,
		request: &ProductionRequest,
	) -> Result<ProductionRequest, BackendError> {
		let mut production = self.production.write().await;
		if !production.contains_key(&request.id) {
			return Err(BackendError::NotFound);
		}
		production.insert(request.id.clone(), request.clone());
		Ok(request.clone())
	}

	async fn patch_production_status(
		&self,
		id: &str,
		status: ProductionStatus,
	) -> Result<ProductionRequest, BackendError> {
		let mut production = self.production.write().await;
		let request = production.get_mut(id).ok_or(BackendError::NotFound)?;
		request.status = status;
		Ok(request.clone())
	}

	async fn create_supplier(
		&self,
		supplier: &NewSupplier,
	) -> Result<SupplierRecord, BackendError> {
		let record = SupplierRecord {
			id: Uuid::new_v4().to_string(),
			name: supplier.name.clone(),
			supplier_type: supplier.supplier_type,
			contact_number: supplier.contact_number.clone(),
			email: supplier.email.clone(),
			address: supplier.address.clone(),
		};
		let mut suppliers = self.suppliers.write().await;
		suppliers.insert(record.id.clone(), record.clone());
		Ok(record)
	}

	async fn list_suppliers(&self) -> Result<Vec<SupplierRecord>, BackendError> {
		let suppliers = self.suppliers.read().await;
		Ok(suppliers.values().cloned().collect())
	}

	async fn delete_supplier(&self, id: &str) -> Result<(), BackendError> {
		let mut suppliers = self.suppliers.write().await;
		suppliers.remove(id).map(|_| ()).ok_or(BackendError::NotFound)
	}
}

/// Registry for the in-memory backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = BackendFactory;

	fn factory() -> Self::Factory {
		create_backend
	}
}

impl BackendRegistry for Registry {}

/// Factory function to create an in-memory backend from configuration.
///
/// No configuration parameters are required.
pub fn create_backend(_config: &toml::Value) -> Result<Box<dyn BackendInterface>, BackendError> {
	Ok(Box::new(MemoryBackend::new()))
}
