//! Supplier directory record types.
//!
//! Records in the partner directory are owned and fully managed by the
//! directory service on behalf of an administrator. Lifecycle engines only
//! ever reference them by identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered supplier or manufacturer partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRecord {
	/// Opaque, server-issued identifier.
	pub id: String,
	pub name: String,
	pub supplier_type: SupplierType,
	pub contact_number: String,
	pub email: String,
	pub address: String,
}

/// Administrator-supplied fields for a new directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
	pub name: String,
	pub supplier_type: SupplierType,
	pub contact_number: String,
	pub email: String,
	pub address: String,
}

/// What side of the platform a directory partner serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierType {
	BottleManufacturer,
	WaterSupplier,
	Both,
}

impl fmt::Display for SupplierType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SupplierType::BottleManufacturer => write!(f, "bottle_manufacturer"),
			SupplierType::WaterSupplier => write!(f, "water_supplier"),
			SupplierType::Both => write!(f, "both"),
		}
	}
}

impl std::str::FromStr for SupplierType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"bottle_manufacturer" => Ok(SupplierType::BottleManufacturer),
			"water_supplier" => Ok(SupplierType::WaterSupplier),
			"both" => Ok(SupplierType::Both),
			other => Err(format!("unknown supplier type: {}", other)),
		}
	}
}
