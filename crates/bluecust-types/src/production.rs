//! Manufacturing production request types.
//!
//! A production request expresses manufacturing-side work derived from
//! venture demand. It is a distinct entity from an order: the two lifecycles
//! are independent state machines over related but separate records, and no
//! foreign-key invariant links them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A production request routed to a manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRequest {
	/// Opaque, server-issued identifier.
	pub id: String,
	/// Email of the originating venture.
	pub venture_email: String,
	/// Display name of the originating venture.
	pub venture_name: String,
	/// Email of the manufacturer the request is assigned to.
	pub manufacturer_email: String,
	/// Number of bottles to produce.
	pub quantity: u32,
	/// Brand text for the sticker run.
	pub sticker_text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sticker_design_notes: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bottle_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cap_color: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub special_requirements: Option<String>,
	/// Production deadline as a Unix timestamp, if one was set.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deadline: Option<u64>,
	/// Unix timestamp (seconds) when the request was created.
	pub created_at: u64,
	/// Current production status.
	pub status: ProductionStatus,
}

/// Fields supplied when the admin flow engages manufacturing capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionDraft {
	pub venture_email: String,
	pub venture_name: String,
	pub manufacturer_email: String,
	pub quantity: u32,
	pub sticker_text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sticker_design_notes: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bottle_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cap_color: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub special_requirements: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deadline: Option<u64>,
}

/// Specification changes applicable while a request is still `pending`.
///
/// `None` fields are left untouched. Quantity, brand text, and specification
/// fields are immutable once the request leaves `pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificationUpdate {
	pub quantity: Option<u32>,
	pub sticker_text: Option<String>,
	pub sticker_design_notes: Option<String>,
	pub bottle_type: Option<String>,
	pub label_type: Option<String>,
	pub cap_color: Option<String>,
	pub special_requirements: Option<String>,
	pub deadline: Option<u64>,
}

/// Production status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
	/// Created, not yet acknowledged by the manufacturer.
	Pending,
	/// The manufacturer has started the production run.
	InProduction,
	/// Production finished. Terminal.
	Completed,
	/// Declined by the manufacturer. Terminal.
	Rejected,
}

impl ProductionStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			ProductionStatus::Completed | ProductionStatus::Rejected
		)
	}
}

impl fmt::Display for ProductionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProductionStatus::Pending => write!(f, "pending"),
			ProductionStatus::InProduction => write!(f, "in_production"),
			ProductionStatus::Completed => write!(f, "completed"),
			ProductionStatus::Rejected => write!(f, "rejected"),
		}
	}
}

impl std::str::FromStr for ProductionStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(ProductionStatus::Pending),
			"in_production" => Ok(ProductionStatus::InProduction),
			"completed" => Ok(ProductionStatus::Completed),
			"rejected" => Ok(ProductionStatus::Rejected),
			other => Err(format!("unknown production status: {}", other)),
		}
	}
}

/// Aggregate counts over a manufacturer's request set.
///
/// Always derived by full recomputation from the authoritative list, never
/// incrementally patched, so the counts cannot drift from the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionStats {
	pub pending: usize,
	pub in_production: usize,
	pub completed: usize,
	pub rejected: usize,
	pub total_bottles: u64,
}

impl ProductionStats {
	/// Recomputes the aggregates from a request set.
	pub fn from_requests(requests: &[ProductionRequest]) -> Self {
		let mut stats = ProductionStats::default();
		for request in requests {
			match request.status {
				ProductionStatus::Pending => stats.pending += 1,
				ProductionStatus::InProduction => stats.in_production += 1,
				ProductionStatus::Completed => stats.completed += 1,
				ProductionStatus::Rejected => stats.rejected += 1,
			}
			stats.total_bottles += u64::from(request.quantity);
		}
		stats
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(status: ProductionStatus, quantity: u32) -> ProductionRequest {
		ProductionRequest {
			id: "req-1".into(),
			venture_email: "cafe@example.com".into(),
			venture_name: "Cafe X".into(),
			manufacturer_email: "mfg@example.com".into(),
			quantity,
			sticker_text: "Cafe X".into(),
			sticker_design_notes: None,
			bottle_type: Some("500ml PET".into()),
			label_type: None,
			cap_color: None,
			special_requirements: None,
			deadline: None,
			created_at: 1_700_000_000,
			status,
		}
	}

	#[test]
	fn stats_are_recomputed_from_the_full_set() {
		let requests = vec![
			request(ProductionStatus::Pending, 100),
			request(ProductionStatus::Pending, 50),
			request(ProductionStatus::InProduction, 200),
			request(ProductionStatus::Completed, 300),
			request(ProductionStatus::Rejected, 25),
		];
		let stats = ProductionStats::from_requests(&requests);
		assert_eq!(stats.pending, 2);
		assert_eq!(stats.in_production, 1);
		assert_eq!(stats.completed, 1);
		assert_eq!(stats.rejected, 1);
		assert_eq!(stats.total_bottles, 675);
	}

	#[test]
	fn empty_set_yields_zeroed_stats() {
		assert_eq!(ProductionStats::from_requests(&[]), ProductionStats::default());
	}

	#[test]
	fn status_wire_format_matches_backend() {
		assert_eq!(
			serde_json::to_string(&ProductionStatus::InProduction).unwrap(),
			r#""in_production""#
		);
	}
}
