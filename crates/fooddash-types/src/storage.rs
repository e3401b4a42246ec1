//! Keys used in client storage.

use std::str::FromStr;

/// Well-known client storage entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// The bearer token. The key name itself is configurable and defaults to
	/// `accessToken`.
	AccessToken,
	/// The persisted shopping cart.
	Cart,
}

impl StorageKey {
	/// Returns the default key name.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::AccessToken => "accessToken",
			StorageKey::Cart => "cart",
		}
	}

	pub fn all() -> impl Iterator<Item = Self> {
		[Self::AccessToken, Self::Cart].into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"accessToken" => Ok(Self::AccessToken),
			"cart" => Ok(Self::Cart),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
