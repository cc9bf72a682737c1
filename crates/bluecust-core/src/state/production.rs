//! Production request state machine.
//!
//! Manages manufacturing requests through their lifecycle:
//! pending -> in_production -> completed, with rejection as the escape out
//! of pending. `completed` is reachable only from `in_production`, which
//! forces a manufacturer to acknowledge work before closing it.
//!
//! Aggregate counts are always recomputed from the authoritative request
//! set; nothing is patched incrementally, so the numbers cannot drift.

use crate::{entity_error, truncate_id, CoreError};
use bluecust_backend::BackendInterface;
use bluecust_types::{
	Principal, ProductionDraft, ProductionRequest, ProductionStats, ProductionStatus, Role,
	SpecificationUpdate,
};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Static transition table - each state maps to allowed next states.
static TRANSITIONS: Lazy<HashMap<ProductionStatus, HashSet<ProductionStatus>>> =
	Lazy::new(|| {
		let mut m = HashMap::new();
		m.insert(
			ProductionStatus::Pending,
			HashSet::from([ProductionStatus::InProduction, ProductionStatus::Rejected]),
		);
		m.insert(
			ProductionStatus::InProduction,
			HashSet::from([ProductionStatus::Completed]),
		);
		m.insert(ProductionStatus::Completed, HashSet::new()); // terminal
		m.insert(ProductionStatus::Rejected, HashSet::new()); // terminal
		m
	});

/// Role-gated engine over production requests.
pub struct ProductionLifecycle {
	backend: Arc<dyn BackendInterface>,
}

impl ProductionLifecycle {
	pub fn new(backend: Arc<dyn BackendInterface>) -> Self {
		Self { backend }
	}

	/// Checks if a state transition is valid.
	fn is_valid_transition(from: &ProductionStatus, to: &ProductionStatus) -> bool {
		TRANSITIONS.get(from).is_some_and(|set| set.contains(to))
	}

	/// A manufacturer may only touch requests routed to it; the
	/// administrator may touch any.
	fn check_assignment(
		role: Role,
		principal: &Principal,
		request: &ProductionRequest,
		action: &str,
	) -> Result<(), CoreError> {
		if !role.can_run_production() {
			return Err(CoreError::unauthorized(role, action));
		}
		if role == Role::Manufacturer && request.manufacturer_email != principal.email {
			return Err(CoreError::unauthorized(
				role,
				format!("{} for another manufacturer", action),
			));
		}
		Ok(())
	}

	/// Creates a production request, engaging manufacturing capacity.
	/// Administrator only: ventures express demand through orders, and the
	/// admin flow decides when to turn demand into manufacturing work.
	pub async fn create(
		&self,
		principal: &Principal,
		draft: ProductionDraft,
	) -> Result<ProductionRequest, CoreError> {
		let role = Role::resolve(principal);
		if !role.is_administrator() {
			return Err(CoreError::unauthorized(role, "engage manufacturing capacity"));
		}
		if draft.quantity < 1 {
			return Err(CoreError::invalid("quantity must be at least 1"));
		}
		if draft.sticker_text.trim().is_empty() {
			return Err(CoreError::invalid("sticker text is required"));
		}
		if draft.manufacturer_email.trim().is_empty() {
			return Err(CoreError::invalid("a manufacturer assignment is required"));
		}

		let request = self.backend.create_production_request(&draft).await?;
		tracing::info!(
			request_id = %truncate_id(&request.id),
			manufacturer = %request.manufacturer_email,
			quantity = request.quantity,
			"Production request created"
		);
		Ok(request)
	}

	/// Lists requests routed to the acting manufacturer. The projection is
	/// the backend's query scope, not client-side filtering.
	pub async fn assigned_to(
		&self,
		principal: &Principal,
	) -> Result<Vec<ProductionRequest>, CoreError> {
		let role = Role::resolve(principal);
		if !role.can_run_production() {
			return Err(CoreError::unauthorized(role, "list production requests"));
		}
		Ok(self
			.backend
			.production_for_manufacturer(&principal.email)
			.await?)
	}

	/// Lists every production request on the platform. Administrator only.
	pub async fn all_requests(
		&self,
		principal: &Principal,
	) -> Result<Vec<ProductionRequest>, CoreError> {
		let role = Role::resolve(principal);
		if !role.is_administrator() {
			return Err(CoreError::unauthorized(role, "list all production requests"));
		}
		Ok(self.backend.all_production_requests().await?)
	}

	/// Transitions a request to a new status with validation.
	pub async fn transition(
		&self,
		principal: &Principal,
		request_id: &str,
		new_status: ProductionStatus,
	) -> Result<ProductionRequest, CoreError> {
		let role = Role::resolve(principal);
		let request = self
			.backend
			.get_production_request(request_id)
			.await
			.map_err(entity_error(request_id))?;

		Self::check_assignment(
			role,
			principal,
			&request,
			&format!("set production status to {}", new_status),
		)?;

		if !Self::is_valid_transition(&request.status, &new_status) {
			tracing::warn!(
				request_id = %truncate_id(request_id),
				from = %request.status,
				to = %new_status,
				"Rejected unreachable production transition"
			);
			return Err(CoreError::StateTransition {
				from: request.status.to_string(),
				to: new_status.to_string(),
			});
		}

		let confirmed = self
			.backend
			.patch_production_status(request_id, new_status)
			.await
			.map_err(entity_error(request_id))?;
		tracing::info!(
			request_id = %truncate_id(request_id),
			from = %request.status,
			to = %confirmed.status,
			"Production transition confirmed"
		);
		Ok(confirmed)
	}

	/// Applies specification changes to a request still in `pending`.
	///
	/// Quantity, brand text, and specification fields are immutable once
	/// the request leaves `pending`.
	pub async fn update_specifications(
		&self,
		principal: &Principal,
		request_id: &str,
		update: SpecificationUpdate,
	) -> Result<ProductionRequest, CoreError> {
		let role = Role::resolve(principal);
		let mut request = self
			.backend
			.get_production_request(request_id)
			.await
			.map_err(entity_error(request_id))?;

		Self::check_assignment(role, principal, &request, "update specifications")?;

		if request.status != ProductionStatus::Pending {
			return Err(CoreError::invalid(format!(
				"specifications are immutable once a request is {}",
				request.status
			)));
		}
		if let Some(quantity) = update.quantity {
			if quantity < 1 {
				return Err(CoreError::invalid("quantity must be at least 1"));
			}
			request.quantity = quantity;
		}
		if let Some(sticker_text) = update.sticker_text {
			if sticker_text.trim().is_empty() {
				return Err(CoreError::invalid("sticker text is required"));
			}
			request.sticker_text = sticker_text;
		}
		if let Some(notes) = update.sticker_design_notes {
			request.sticker_design_notes = Some(notes);
		}
		if let Some(bottle_type) = update.bottle_type {
			request.bottle_type = Some(bottle_type);
		}
		if let Some(label_type) = update.label_type {
			request.label_type = Some(label_type);
		}
		if let Some(cap_color) = update.cap_color {
			request.cap_color = Some(cap_color);
		}
		if let Some(special_requirements) = update.special_requirements {
			request.special_requirements = Some(special_requirements);
		}
		if let Some(deadline) = update.deadline {
			request.deadline = Some(deadline);
		}

		let confirmed = self
			.backend
			.update_production_request(&request)
			.await
			.map_err(entity_error(request_id))?;
		tracing::info!(
			request_id = %truncate_id(request_id),
			"Production specifications updated"
		);
		Ok(confirmed)
	}

	/// Recomputes aggregate counts over the requests visible to the acting
	/// principal: the manufacturer's own queue, or the whole platform for
	/// the administrator.
	pub async fn stats_for(&self, principal: &Principal) -> Result<ProductionStats, CoreError> {
		let role = Role::resolve(principal);
		let requests = if role.is_administrator() {
			self.all_requests(principal).await?
		} else {
			self.assigned_to(principal).await?
		};
		Ok(ProductionStats::from_requests(&requests))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bluecust_backend::implementations::memory::MemoryBackend;
	use bluecust_types::BusinessType;

	fn lifecycle() -> ProductionLifecycle {
		ProductionLifecycle::new(Arc::new(MemoryBackend::new()))
	}

	fn manufacturer(email: &str) -> Principal {
		Principal {
			email: email.into(),
			business_name: "Bottle Works".into(),
			business_type: BusinessType::BottleManufacturer,
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

	fn venture() -> Principal {
		Principal {
			email: "cafe@x.com".into(),
			business_name: "Cafe X".into(),
			business_type: BusinessType::Cafe,
			is_admin: false,
		}
	}

	fn draft(manufacturer_email: &str, quantity: u32) -> ProductionDraft {
		ProductionDraft {
			venture_email: "cafe@x.com".into(),
			venture_name: "Cafe X".into(),
			manufacturer_email: manufacturer_email.into(),
			quantity,
			sticker_text: "Cafe X".into(),
			sticker_design_notes: None,
			bottle_type: Some("500ml PET".into()),
			label_type: Some("Adhesive Sticker".into()),
			cap_color: None,
			special_requirements: None,
			deadline: None,
		}
	}

	#[tokio::test]
	async fn test_only_the_admin_flow_creates_requests() {
		let production = lifecycle();
		let result = production
			.create(&manufacturer("mfg@z.com"), draft("mfg@z.com", 100))
			.await;
		assert!(matches!(result, Err(CoreError::Authorization { .. })));

		let request = production
			.create(&admin(), draft("mfg@z.com", 100))
			.await
			.unwrap();
		assert_eq!(request.status, ProductionStatus::Pending);
	}

	#[tokio::test]
	async fn test_completion_requires_acknowledged_production() {
		let production = lifecycle();
		let mfg = manufacturer("mfg@z.com");
		let request = production
			.create(&admin(), draft(&mfg.email, 100))
			.await
			.unwrap();

		// pending -> completed must be rejected
		let skipped = production
			.transition(&mfg, &request.id, ProductionStatus::Completed)
			.await;
		assert!(matches!(skipped, Err(CoreError::StateTransition { .. })));

		let request = production
			.transition(&mfg, &request.id, ProductionStatus::InProduction)
			.await
			.unwrap();
		let request = production
			.transition(&mfg, &request.id, ProductionStatus::Completed)
			.await
			.unwrap();
		assert_eq!(request.status, ProductionStatus::Completed);
	}

	#[tokio::test]
	async fn test_rejection_escapes_only_from_pending() {
		let production = lifecycle();
		let mfg = manufacturer("mfg@z.com");
		let request = production
			.create(&admin(), draft(&mfg.email, 100))
			.await
			.unwrap();
		production
			.transition(&mfg, &request.id, ProductionStatus::InProduction)
			.await
			.unwrap();

		let result = production
			.transition(&mfg, &request.id, ProductionStatus::Rejected)
			.await;
		assert!(matches!(result, Err(CoreError::StateTransition { .. })));
	}

	#[tokio::test]
	async fn test_pending_may_be_rejected() {
		let production = lifecycle();
		let mfg = manufacturer("mfg@z.com");
		let request = production
			.create(&admin(), draft(&mfg.email, 100))
			.await
			.unwrap();
		let request = production
			.transition(&mfg, &request.id, ProductionStatus::Rejected)
			.await
			.unwrap();
		assert_eq!(request.status, ProductionStatus::Rejected);
	}

	#[tokio::test]
	async fn test_foreign_manufacturer_is_rejected() {
		let production = lifecycle();
		let request = production
			.create(&admin(), draft("mfg@z.com", 100))
			.await
			.unwrap();
		let other = manufacturer("other@w.com");
		let result = production
			.transition(&other, &request.id, ProductionStatus::InProduction)
			.await;
		assert!(matches!(result, Err(CoreError::Authorization { .. })));
	}

	#[tokio::test]
	async fn test_venture_cannot_transition_production() {
		let production = lifecycle();
		let request = production
			.create(&admin(), draft("mfg@z.com", 100))
			.await
			.unwrap();
		let result = production
			.transition(&venture(), &request.id, ProductionStatus::InProduction)
			.await;
		assert!(matches!(result, Err(CoreError::Authorization { .. })));
	}

	#[tokio::test]
	async fn test_specifications_freeze_outside_pending() {
		let production = lifecycle();
		let mfg = manufacturer("mfg@z.com");
		let request = production
			.create(&admin(), draft(&mfg.email, 100))
			.await
			.unwrap();

		let update = SpecificationUpdate {
			cap_color: Some("Standard Blue".into()),
			..Default::default()
		};
		let updated = production
			.update_specifications(&mfg, &request.id, update)
			.await
			.unwrap();
		assert_eq!(updated.cap_color.as_deref(), Some("Standard Blue"));

		production
			.transition(&mfg, &request.id, ProductionStatus::InProduction)
			.await
			.unwrap();

		let frozen = production
			.update_specifications(
				&mfg,
				&request.id,
				SpecificationUpdate {
					quantity: Some(500),
					..Default::default()
				},
			)
			.await;
		assert!(matches!(frozen, Err(CoreError::Validation(_))));
	}

	#[tokio::test]
	async fn test_stats_recompute_from_the_visible_queue() {
		let production = lifecycle();
		let mfg = manufacturer("mfg@z.com");
		let first = production
			.create(&admin(), draft(&mfg.email, 100))
			.await
			.unwrap();
		production
			.create(&admin(), draft(&mfg.email, 50))
			.await
			.unwrap();
		// Routed elsewhere, invisible to mfg
		production
			.create(&admin(), draft("other@w.com", 999))
			.await
			.unwrap();

		production
			.transition(&mfg, &first.id, ProductionStatus::InProduction)
			.await
			.unwrap();

		let stats = production.stats_for(&mfg).await.unwrap();
		assert_eq!(stats.pending, 1);
		assert_eq!(stats.in_production, 1);
		assert_eq!(stats.completed, 0);
		assert_eq!(stats.total_bottles, 150);

		let platform = production.stats_for(&admin()).await.unwrap();
		assert_eq!(platform.total_bottles, 1149);
	}
}
