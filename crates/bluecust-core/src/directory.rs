//! Supplier directory management.
//!
//! Administrator-only CRUD over the partner directory. Every field of a new
//! record is validated before the backend is touched, so a rejected add
//! leaves the directory unchanged.

use crate::{entity_error, truncate_id, CoreError};
use bluecust_backend::BackendInterface;
use bluecust_types::{NewSupplier, Principal, Role, SupplierRecord};
use std::sync::Arc;

/// Role-gated directory operations.
pub struct DirectoryService {
	backend: Arc<dyn BackendInterface>,
}

impl DirectoryService {
	pub fn new(backend: Arc<dyn BackendInterface>) -> Self {
		Self { backend }
	}

	fn require_admin(principal: &Principal, action: &str) -> Result<(), CoreError> {
		let role = Role::resolve(principal);
		if !role.is_administrator() {
			return Err(CoreError::unauthorized(role, action));
		}
		Ok(())
	}

	/// Rejects blank fields before anything reaches the backend.
	fn validate(supplier: &NewSupplier) -> Result<(), CoreError> {
		let fields = [
			("name", &supplier.name),
			("contact_number", &supplier.contact_number),
			("email", &supplier.email),
			("address", &supplier.address),
		];
		for (field, value) in fields {
			if value.trim().is_empty() {
				return Err(CoreError::invalid(format!("{} is required", field)));
			}
		}
		Ok(())
	}

	/// Adds a partner record to the directory.
	pub async fn add(
		&self,
		principal: &Principal,
		supplier: NewSupplier,
	) -> Result<SupplierRecord, CoreError> {
		Self::require_admin(principal, "add a directory record")?;
		Self::validate(&supplier)?;

		let record = self.backend.create_supplier(&supplier).await?;
		tracing::info!(
			supplier_id = %truncate_id(&record.id),
			name = %record.name,
			supplier_type = %record.supplier_type,
			"Directory record added"
		);
		Ok(record)
	}

	/// Lists every partner record.
	pub async fn list(&self, principal: &Principal) -> Result<Vec<SupplierRecord>, CoreError> {
		Self::require_admin(principal, "list the directory")?;
		Ok(self.backend.list_suppliers().await?)
	}

	/// Removes a partner record by identifier.
	pub async fn remove(&self, principal: &Principal, id: &str) -> Result<(), CoreError> {
		Self::require_admin(principal, "remove a directory record")?;
		self.backend
			.delete_supplier(id)
			.await
			.map_err(entity_error(id))?;
		tracing::info!(supplier_id = %truncate_id(id), "Directory record removed");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bluecust_backend::implementations::memory::MemoryBackend;
	use bluecust_types::{BusinessType, SupplierType};

	fn service() -> DirectoryService {
		DirectoryService::new(Arc::new(MemoryBackend::new()))
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

	fn new_supplier(name: &str) -> NewSupplier {
		NewSupplier {
			name: name.into(),
			supplier_type: SupplierType::BottleManufacturer,
			contact_number: "+91 98765 43210".into(),
			email: "sales@bottleworks.example".into(),
			address: "14 Industrial Estate, Pune".into(),
		}
	}

	#[tokio::test]
	async fn test_directory_is_admin_only() {
		let directory = service();
		let caller = venture();
		assert!(matches!(
			directory.add(&caller, new_supplier("Bottle Works")).await,
			Err(CoreError::Authorization { .. })
		));
		assert!(matches!(
			directory.list(&caller).await,
			Err(CoreError::Authorization { .. })
		));
		assert!(matches!(
			directory.remove(&caller, "some-id").await,
			Err(CoreError::Authorization { .. })
		));
	}

	#[tokio::test]
	async fn test_blank_fields_leave_the_directory_unchanged() {
		let directory = service();
		let mut supplier = new_supplier("Bottle Works");
		supplier.contact_number = "   ".into();

		let result = directory.add(&admin(), supplier).await;
		assert!(matches!(
			result,
			Err(CoreError::Validation(ref msg)) if msg.contains("contact_number")
		));
		assert!(directory.list(&admin()).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_add_list_remove_round_trip() {
		let directory = service();
		let record = directory
			.add(&admin(), new_supplier("Bottle Works"))
			.await
			.unwrap();
		assert_eq!(directory.list(&admin()).await.unwrap().len(), 1);

		directory.remove(&admin(), &record.id).await.unwrap();
		assert!(directory.list(&admin()).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_remove_unknown_record_is_not_found() {
		let directory = service();
		let result = directory.remove(&admin(), "missing").await;
		assert!(matches!(result, Err(CoreError::NotFound(_))));
	}
}
