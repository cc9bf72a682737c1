//! Order fulfillment state machine.
//!
//! Manages customer orders through their lifecycle:
//! pending -> in_progress -> completed, with cancellation as the escape
//! route out of any non-terminal state. Advancement is a supplier/admin
//! capability; ventures place, edit, and may cancel their own orders.
//!
//! Nothing is applied optimistically: the engine validates against the
//! record the backend returns, asks the backend to apply the change, and
//! treats the response as the only authoritative state.

use crate::{entity_error, truncate_id, CoreError};
use bluecust_backend::BackendInterface;
use bluecust_types::{Order, OrderDraft, OrderStatus, Principal, Role};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Static transition table - each state maps to allowed next states.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([
			OrderStatus::InProgress,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		]),
	);
	m.insert(
		OrderStatus::InProgress,
		HashSet::from([OrderStatus::Completed, OrderStatus::Cancelled]),
	);
	m.insert(OrderStatus::Completed, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Role-gated engine over customer orders.
pub struct OrderLifecycle {
	backend: Arc<dyn BackendInterface>,
	/// Process-wide per-bottle rate from configuration. Not user-editable.
	unit_rate: u64,
}

impl OrderLifecycle {
	pub fn new(backend: Arc<dyn BackendInterface>, unit_rate: u64) -> Self {
		Self { backend, unit_rate }
	}

	/// Checks if a state transition is valid.
	fn is_valid_transition(from: &OrderStatus, to: &OrderStatus) -> bool {
		TRANSITIONS.get(from).is_some_and(|set| set.contains(to))
	}

	/// Places a new order for the acting venture.
	///
	/// The total is computed here as quantity times the configured unit
	/// rate; the backend issues the id and timestamp and its response is
	/// the authoritative record.
	pub async fn place(
		&self,
		principal: &Principal,
		draft: OrderDraft,
	) -> Result<Order, CoreError> {
		let role = Role::resolve(principal);
		if !role.can_place_orders() {
			return Err(CoreError::unauthorized(role, "place orders"));
		}
		if draft.quantity < 1 {
			return Err(CoreError::invalid("quantity must be at least 1"));
		}
		if draft.sticker_text.trim().is_empty() {
			return Err(CoreError::invalid("sticker text is required"));
		}

		let total_amount = u64::from(draft.quantity) * self.unit_rate;
		let order = self
			.backend
			.create_order(&principal.email, &draft, total_amount)
			.await?;
		tracing::info!(
			order_id = %truncate_id(&order.id),
			quantity = order.quantity,
			total = order.total_amount,
			"Order placed"
		);
		Ok(order)
	}

	/// Lists the acting principal's own orders. The projection is enforced
	/// by the backend's query scope, so foreign orders never reach memory.
	pub async fn my_orders(&self, principal: &Principal) -> Result<Vec<Order>, CoreError> {
		Ok(self.backend.orders_for_venture(&principal.email).await?)
	}

	/// Lists every order on the platform. Supplier/administrator only.
	pub async fn all_orders(&self, principal: &Principal) -> Result<Vec<Order>, CoreError> {
		let role = Role::resolve(principal);
		if !role.can_fulfill_orders() {
			return Err(CoreError::unauthorized(role, "list all orders"));
		}
		Ok(self.backend.all_orders().await?)
	}

	/// Transitions an order to a new status with validation.
	///
	/// Advancement (`in_progress`, `completed`) requires the supplier or
	/// administrator view. Cancellation is additionally open to the venture
	/// that owns the order. An unreachable target status is rejected before
	/// any backend call, leaving the entity unchanged.
	pub async fn transition(
		&self,
		principal: &Principal,
		order_id: &str,
		new_status: OrderStatus,
	) -> Result<Order, CoreError> {
		let role = Role::resolve(principal);
		let order = self
			.backend
			.get_order(order_id)
			.await
			.map_err(entity_error(order_id))?;

		let authorized = match new_status {
			OrderStatus::Cancelled => {
				role.can_fulfill_orders()
					|| (role == Role::Venture && order.venture_email == principal.email)
			}
			_ => role.can_fulfill_orders(),
		};
		if !authorized {
			return Err(CoreError::unauthorized(
				role,
				format!("set order status to {} on {}", new_status, truncate_id(order_id)),
			));
		}

		if !Self::is_valid_transition(&order.status, &new_status) {
			tracing::warn!(
				order_id = %truncate_id(order_id),
				from = %order.status,
				to = %new_status,
				"Rejected unreachable order transition"
			);
			return Err(CoreError::StateTransition {
				from: order.status.to_string(),
				to: new_status.to_string(),
			});
		}

		let confirmed = self
			.backend
			.patch_order_status(order_id, new_status)
			.await
			.map_err(entity_error(order_id))?;
		tracing::info!(
			order_id = %truncate_id(order_id),
			from = %order.status,
			to = %confirmed.status,
			"Order transition confirmed"
		);
		Ok(confirmed)
	}

	/// Changes the quantity of a non-terminal order, recomputing the total
	/// from the configured unit rate before anything is sent.
	pub async fn set_quantity(
		&self,
		principal: &Principal,
		order_id: &str,
		quantity: u32,
	) -> Result<Order, CoreError> {
		let role = Role::resolve(principal);
		if quantity < 1 {
			return Err(CoreError::invalid("quantity must be at least 1"));
		}

		let mut order = self
			.backend
			.get_order(order_id)
			.await
			.map_err(entity_error(order_id))?;

		let owns_order = order.venture_email == principal.email;
		if !(role.is_administrator() || (role == Role::Venture && owns_order)) {
			return Err(CoreError::unauthorized(role, "change the order quantity"));
		}
		if order.status.is_terminal() {
			return Err(CoreError::invalid(format!(
				"cannot change quantity of a {} order",
				order.status
			)));
		}

		order.quantity = quantity;
		order.recompute_total(self.unit_rate);
		let confirmed = self
			.backend
			.update_order(&order)
			.await
			.map_err(entity_error(order_id))?;
		tracing::info!(
			order_id = %truncate_id(order_id),
			quantity = confirmed.quantity,
			total = confirmed.total_amount,
			"Order quantity updated"
		);
		Ok(confirmed)
	}

	/// Fetches the rendered bill for an order as an opaque byte blob.
	/// Ventures may only fetch bills for their own orders.
	pub async fn fetch_bill(
		&self,
		principal: &Principal,
		order_id: &str,
	) -> Result<Vec<u8>, CoreError> {
		let role = Role::resolve(principal);
		if !role.can_fulfill_orders() {
			let order = self
				.backend
				.get_order(order_id)
				.await
				.map_err(entity_error(order_id))?;
			if order.venture_email != principal.email {
				return Err(CoreError::unauthorized(role, "fetch this order's bill"));
			}
		}
		Ok(self
			.backend
			.fetch_order_bill(order_id)
			.await
			.map_err(entity_error(order_id))?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bluecust_backend::implementations::memory::MemoryBackend;
	use bluecust_types::{BusinessType, PaymentMode};

	const RATE: u64 = 16;

	fn lifecycle() -> OrderLifecycle {
		OrderLifecycle::new(Arc::new(MemoryBackend::new()), RATE)
	}

	fn venture(email: &str) -> Principal {
		Principal {
			email: email.into(),
			business_name: "Cafe X".into(),
			business_type: BusinessType::Cafe,
			is_admin: false,
		}
	}

	fn supplier() -> Principal {
		Principal {
			email: "water@example.com".into(),
			business_name: "Aqua Partner".into(),
			business_type: BusinessType::WaterSupplier,
			is_admin: false,
		}
	}

	fn admin() -> Principal {
		Principal {
			email: "admin@example.com".into(),
			business_name: "BlueCust".into(),
			business_type: BusinessType::Other,
			is_admin: true,
		}
	}

	fn draft(quantity: u32) -> OrderDraft {
		OrderDraft {
			quantity,
			sticker_text: "Cafe X".into(),
			sticker_design_notes: None,
			payment_mode: PaymentMode::Cash,
		}
	}

	#[tokio::test]
	async fn test_total_is_derived_from_quantity_and_rate() {
		let orders = lifecycle();
		let order = orders.place(&venture("cafe@x.com"), draft(100)).await.unwrap();
		assert_eq!(order.total_amount, 1600);
		assert_eq!(order.status, OrderStatus::Pending);
	}

	#[tokio::test]
	async fn test_supplier_cannot_place_orders() {
		let orders = lifecycle();
		let result = orders.place(&supplier(), draft(10)).await;
		assert!(matches!(result, Err(CoreError::Authorization { .. })));
	}

	#[tokio::test]
	async fn test_zero_quantity_is_rejected() {
		let orders = lifecycle();
		let result = orders.place(&venture("cafe@x.com"), draft(0)).await;
		assert!(matches!(result, Err(CoreError::Validation(_))));
	}

	#[tokio::test]
	async fn test_blank_sticker_text_is_rejected() {
		let orders = lifecycle();
		let mut d = draft(10);
		d.sticker_text = "   ".into();
		let result = orders.place(&venture("cafe@x.com"), d).await;
		assert!(matches!(result, Err(CoreError::Validation(_))));
	}

	#[tokio::test]
	async fn test_supplier_advances_pending_to_completed() {
		let orders = lifecycle();
		let order = orders.place(&venture("cafe@x.com"), draft(10)).await.unwrap();

		let order = orders
			.transition(&supplier(), &order.id, OrderStatus::InProgress)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::InProgress);

		let order = orders
			.transition(&supplier(), &order.id, OrderStatus::Completed)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Completed);
	}

	#[tokio::test]
	async fn test_pending_may_complete_directly() {
		let orders = lifecycle();
		let order = orders.place(&venture("cafe@x.com"), draft(10)).await.unwrap();
		let order = orders
			.transition(&admin(), &order.id, OrderStatus::Completed)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Completed);
	}

	#[tokio::test]
	async fn test_venture_cannot_advance_its_own_order() {
		let orders = lifecycle();
		let cafe = venture("cafe@x.com");
		let order = orders.place(&cafe, draft(10)).await.unwrap();
		let result = orders
			.transition(&cafe, &order.id, OrderStatus::InProgress)
			.await;
		assert!(matches!(result, Err(CoreError::Authorization { .. })));
	}

	#[tokio::test]
	async fn test_venture_may_cancel_only_its_own_order() {
		let orders = lifecycle();
		let cafe = venture("cafe@x.com");
		let hotel = venture("hotel@y.com");
		let order = orders.place(&cafe, draft(10)).await.unwrap();

		let foreign = orders
			.transition(&hotel, &order.id, OrderStatus::Cancelled)
			.await;
		assert!(matches!(foreign, Err(CoreError::Authorization { .. })));

		let own = orders
			.transition(&cafe, &order.id, OrderStatus::Cancelled)
			.await
			.unwrap();
		assert_eq!(own.status, OrderStatus::Cancelled);
	}

	#[tokio::test]
	async fn test_terminal_states_admit_no_transitions() {
		let orders = lifecycle();
		let order = orders.place(&venture("cafe@x.com"), draft(10)).await.unwrap();
		orders
			.transition(&supplier(), &order.id, OrderStatus::Completed)
			.await
			.unwrap();

		for target in [
			OrderStatus::Pending,
			OrderStatus::InProgress,
			OrderStatus::Cancelled,
		] {
			let result = orders.transition(&supplier(), &order.id, target).await;
			assert!(matches!(result, Err(CoreError::StateTransition { .. })));
		}

		// The rejected transition left the entity unchanged
		let unchanged = orders
			.all_orders(&supplier())
			.await
			.unwrap()
			.into_iter()
			.find(|o| o.id == order.id)
			.unwrap();
		assert_eq!(unchanged.status, OrderStatus::Completed);
	}

	#[tokio::test]
	async fn test_cancelled_is_terminal() {
		let orders = lifecycle();
		let cafe = venture("cafe@x.com");
		let order = orders.place(&cafe, draft(10)).await.unwrap();
		orders
			.transition(&cafe, &order.id, OrderStatus::Cancelled)
			.await
			.unwrap();
		let result = orders
			.transition(&supplier(), &order.id, OrderStatus::InProgress)
			.await;
		assert!(matches!(result, Err(CoreError::StateTransition { .. })));
	}

	#[tokio::test]
	async fn test_quantity_edit_recomputes_total() {
		let orders = lifecycle();
		let cafe = venture("cafe@x.com");
		let order = orders.place(&cafe, draft(50)).await.unwrap();
		assert_eq!(order.total_amount, 800);

		let order = orders.set_quantity(&cafe, &order.id, 100).await.unwrap();
		assert_eq!(order.total_amount, 1600);
	}

	#[tokio::test]
	async fn test_quantity_is_frozen_after_terminal_state() {
		let orders = lifecycle();
		let cafe = venture("cafe@x.com");
		let order = orders.place(&cafe, draft(50)).await.unwrap();
		orders
			.transition(&supplier(), &order.id, OrderStatus::Completed)
			.await
			.unwrap();

		let result = orders.set_quantity(&cafe, &order.id, 100).await;
		assert!(matches!(result, Err(CoreError::Validation(_))));
	}

	#[tokio::test]
	async fn test_unknown_order_is_not_found() {
		let orders = lifecycle();
		let result = orders
			.transition(&supplier(), "missing-id", OrderStatus::InProgress)
			.await;
		assert!(matches!(result, Err(CoreError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_venture_listing_sees_only_its_own_orders() {
		let backend = Arc::new(MemoryBackend::new());
		let orders = OrderLifecycle::new(backend, RATE);
		let cafe = venture("cafe@x.com");
		let hotel = venture("hotel@y.com");
		orders.place(&cafe, draft(10)).await.unwrap();
		orders.place(&hotel, draft(20)).await.unwrap();

		let listed = orders.my_orders(&cafe).await.unwrap();
		assert_eq!(listed.len(), 1);
		assert!(listed.iter().all(|o| o.venture_email == cafe.email));
	}

	#[tokio::test]
	async fn test_venture_cannot_fetch_a_foreign_bill() {
		let orders = lifecycle();
		let cafe = venture("cafe@x.com");
		let hotel = venture("hotel@y.com");
		let order = orders.place(&cafe, draft(10)).await.unwrap();

		assert!(matches!(
			orders.fetch_bill(&hotel, &order.id).await,
			Err(CoreError::Authorization { .. })
		));
		assert!(!orders.fetch_bill(&cafe, &order.id).await.unwrap().is_empty());
	}
}
