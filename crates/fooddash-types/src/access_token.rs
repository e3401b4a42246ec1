//! Bearer token read from client storage.

use std::fmt;
use zeroize::Zeroizing;

/// The `accessToken` attached to every backend request.
///
/// The value is zeroed on drop and never printed by `Debug` or `Display`.
/// An absent token is represented by the empty string: requests are still
/// sent and the backend decides whether to reject them.
#[derive(Clone, Default)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
	pub fn new(token: impl Into<String>) -> Self {
		Self(Zeroizing::new(token.into()))
	}

	/// The token used when client storage holds nothing.
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}

	/// Value of the `Authorization` header, `Bearer ` followed by the token.
	/// The copy is zeroed on drop like the token itself.
	pub fn bearer_header(&self) -> Zeroizing<String> {
		Zeroizing::new(format!("Bearer {}", self.0.trim()))
	}

	/// Exposes the raw token, for writing it back to storage.
	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for AccessToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_empty() {
			write!(f, "AccessToken(<none>)")
		} else {
			write!(f, "AccessToken(***)")
		}
	}
}

impl fmt::Display for AccessToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("***")
	}
}

impl PartialEq for AccessToken {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for AccessToken {}

impl From<String> for AccessToken {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}
