//! Capability view resolution.
//!
//! Maps a [`Principal`] to exactly one of four capability views. The mapping
//! is a pure total function: it is re-evaluated on every protected call and
//! never cached beyond the current principal's lifetime.

use crate::principal::{BusinessType, Principal};
use std::fmt;

/// The capability view a principal acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
	/// Platform administrator. May act as any other role.
	Administrator,
	/// Customer business placing bottle orders.
	Venture,
	/// Water-supply partner fulfilling venture orders.
	Supplier,
	/// Bottle/label producer working through production requests.
	Manufacturer,
}

impl Role {
	/// Resolves the capability view for a principal.
	///
	/// Priority order, first match wins:
	/// 1. administrator flag set;
	/// 2. venture classifications (restaurant, hotel, cafe);
	/// 3. manufacturing classifications;
	/// 4. everything else falls back to the supplier view, the least
	///    privileged non-venture role.
	pub fn resolve(principal: &Principal) -> Role {
		if principal.is_admin {
			return Role::Administrator;
		}
		match principal.business_type {
			BusinessType::Restaurant | BusinessType::Hotel | BusinessType::Cafe => Role::Venture,
			BusinessType::Manufacturer | BusinessType::BottleManufacturer => Role::Manufacturer,
			BusinessType::WaterSupplier | BusinessType::Other => Role::Supplier,
		}
	}

	/// Whether this view may advance customer orders through fulfillment.
	pub fn can_fulfill_orders(&self) -> bool {
		matches!(self, Role::Supplier | Role::Administrator)
	}

	/// Whether this view may transition production requests.
	pub fn can_run_production(&self) -> bool {
		matches!(self, Role::Manufacturer | Role::Administrator)
	}

	/// Whether this view may place customer orders.
	pub fn can_place_orders(&self) -> bool {
		matches!(self, Role::Venture | Role::Administrator)
	}

	pub fn is_administrator(&self) -> bool {
		matches!(self, Role::Administrator)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Administrator => write!(f, "administrator"),
			Role::Venture => write!(f, "venture"),
			Role::Supplier => write!(f, "supplier"),
			Role::Manufacturer => write!(f, "manufacturer"),
		}
	}
}
