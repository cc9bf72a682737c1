//! Authenticated identity types.
//!
//! A [`Principal`] is created at registration, held by the session store for
//! the duration of the session, and destroyed at logout. All other components
//! receive it by reference and must not mutate it.

use serde::{Deserialize, Serialize};

/// The authenticated identity for the current session.
///
/// Owned exclusively by the session store; lifecycle engines and the
/// directory service only ever borrow it to resolve a capability view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	/// Email address, doubling as the stable account identifier.
	pub email: String,
	/// Display name of the business.
	pub business_name: String,
	/// Business classification used for capability resolution.
	pub business_type: BusinessType,
	/// Administrator flag. Always overrides the business classification.
	#[serde(default)]
	pub is_admin: bool,
}

/// Business classification of a registered account.
///
/// Unrecognized values deserialize to [`BusinessType::Other`] rather than
/// failing, so the role resolver stays total over every principal the
/// backend can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
	Restaurant,
	Hotel,
	Cafe,
	Manufacturer,
	BottleManufacturer,
	WaterSupplier,
	#[serde(other)]
	Other,
}

impl std::str::FromStr for BusinessType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"restaurant" => Ok(BusinessType::Restaurant),
			"hotel" => Ok(BusinessType::Hotel),
			"cafe" => Ok(BusinessType::Cafe),
			"manufacturer" => Ok(BusinessType::Manufacturer),
			"bottle_manufacturer" => Ok(BusinessType::BottleManufacturer),
			"water_supplier" => Ok(BusinessType::WaterSupplier),
			"other" => Ok(BusinessType::Other),
			other => Err(format!("unknown business type: {}", other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_business_type_degrades_to_other() {
		let principal: Principal = serde_json::from_str(
			r#"{
				"email": "shop@example.com",
				"business_name": "Corner Shop",
				"business_type": "kiosk"
			}"#,
		)
		.unwrap();
		assert_eq!(principal.business_type, BusinessType::Other);
		assert!(!principal.is_admin);
	}

	#[test]
	fn business_type_round_trips_snake_case() {
		let json = serde_json::to_string(&BusinessType::BottleManufacturer).unwrap();
		assert_eq!(json, r#""bottle_manufacturer""#);
	}
}
