//! Actor roles of the marketplace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The actor on whose behalf a view is rendered and actions are submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Customer,
	Restaurant,
	Courier,
	Admin,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Customer => "customer",
			Role::Restaurant => "restaurant",
			Role::Courier => "courier",
			Role::Admin => "admin",
		}
	}

	pub fn all() -> impl Iterator<Item = Self> {
		[Role::Customer, Role::Restaurant, Role::Courier, Role::Admin].into_iter()
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
	type Err = UnknownRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"customer" | "client" => Ok(Role::Customer),
			"restaurant" => Ok(Role::Restaurant),
			"courier" | "delivery" => Ok(Role::Courier),
			"admin" => Ok(Role::Admin),
			other => Err(UnknownRole(other.to_string())),
		}
	}
}
