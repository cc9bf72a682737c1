//! Customer order types.
//!
//! An order expresses venture demand for custom-branded bottles. Orders are
//! created `pending`, mutated only via status transitions, and never deleted:
//! they only ever reach a terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A customer order for branded bottles.
///
/// The `total_amount` field is always derived as `quantity * unit_rate`; it
/// is recomputed on every quantity change before the order becomes terminal
/// and is never stored independently of that relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Opaque, server-issued identifier, stable for the order's lifetime.
	pub id: String,
	/// Email of the venture that placed the order.
	pub venture_email: String,
	/// Number of bottles ordered. Always at least 1.
	pub quantity: u32,
	/// Derived total in currency units.
	pub total_amount: u64,
	/// Brand text printed on the bottle sticker.
	pub sticker_text: String,
	/// Free-form design requirements, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sticker_design_notes: Option<String>,
	/// How the venture intends to pay. Recorded as a label only.
	pub payment_mode: PaymentMode,
	/// Unix timestamp (seconds) when the order was created.
	pub created_at: u64,
	/// Current fulfillment status.
	pub status: OrderStatus,
}

impl Order {
	/// Recomputes the derived total from the current quantity.
	///
	/// Must be called whenever the quantity is set or changed while the
	/// order is non-terminal.
	pub fn recompute_total(&mut self, unit_rate: u64) {
		self.total_amount = u64::from(self.quantity) * unit_rate;
	}
}

/// Venture-supplied fields for a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
	pub quantity: u32,
	pub sticker_text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sticker_design_notes: Option<String>,
	pub payment_mode: PaymentMode,
}

/// Payment mode label recorded on an order.
///
/// Payment processing itself is out of scope; this is bookkeeping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
	Online,
	Cash,
}

impl fmt::Display for PaymentMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMode::Online => write!(f, "online"),
			PaymentMode::Cash => write!(f, "cash"),
		}
	}
}

impl std::str::FromStr for PaymentMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"online" => Ok(PaymentMode::Online),
			"cash" => Ok(PaymentMode::Cash),
			other => Err(format!("unknown payment mode: {}", other)),
		}
	}
}

/// Fulfillment status of a customer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Placed by the venture, not yet picked up by a supplier.
	Pending,
	/// A supplier is fulfilling the order.
	InProgress,
	/// Fulfillment finished. Terminal.
	Completed,
	/// Abandoned before completion. Terminal.
	Cancelled,
}

impl OrderStatus {
	/// Terminal states admit no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "pending"),
			OrderStatus::InProgress => write!(f, "in_progress"),
			OrderStatus::Completed => write!(f, "completed"),
			OrderStatus::Cancelled => write!(f, "cancelled"),
		}
	}
}

impl std::str::FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(OrderStatus::Pending),
			"in_progress" => Ok(OrderStatus::InProgress),
			"completed" => Ok(OrderStatus::Completed),
			"cancelled" => Ok(OrderStatus::Cancelled),
			other => Err(format!("unknown order status: {}", other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn order(quantity: u32) -> Order {
		Order {
			id: "order-1".into(),
			venture_email: "cafe@example.com".into(),
			quantity,
			total_amount: 0,
			sticker_text: "Cafe X".into(),
			sticker_design_notes: None,
			payment_mode: PaymentMode::Cash,
			created_at: 1_700_000_000,
			status: OrderStatus::Pending,
		}
	}

	#[test]
	fn total_is_quantity_times_rate() {
		let mut o = order(100);
		o.recompute_total(16);
		assert_eq!(o.total_amount, 1600);
	}

	#[test]
	fn total_tracks_quantity_edits() {
		let mut o = order(50);
		o.recompute_total(16);
		assert_eq!(o.total_amount, 800);
		o.quantity = 75;
		o.recompute_total(16);
		assert_eq!(o.total_amount, 1200);
	}

	#[test]
	fn status_uses_snake_case_on_the_wire() {
		assert_eq!(
			serde_json::to_string(&OrderStatus::InProgress).unwrap(),
			r#""in_progress""#
		);
		let status: OrderStatus = serde_json::from_str(r#""cancelled""#).unwrap();
		assert!(status.is_terminal());
	}
}
