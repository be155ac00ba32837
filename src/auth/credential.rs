//! Cached bearer credential with its expiry horizon.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Fixed safety margin subtracted from the expiry instant when deciding whether a cached
/// credential may still be attached to outbound calls. Not configurable per call.
pub const EXPIRY_MARGIN: Duration = Duration::minutes(5);

/// One issued bearer token together with its expiry horizon.
///
/// A credential is never mutated after construction; a provider replaces the whole value
/// on the next successful refresh.
#[derive(Clone)]
pub struct Credential {
	/// Bearer token value; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token kind reported by the issuer, `Bearer` in practice.
	pub token_type: String,
	/// Issued lifetime in seconds.
	pub expires_in: u64,
	/// Instant the credential was acquired.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry instant, `issued_at + expires_in`.
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Builds a credential issued at `issued_at` with a relative lifetime in seconds.
	pub fn issued(
		access_token: impl Into<String>,
		token_type: impl Into<String>,
		expires_in: u64,
		issued_at: OffsetDateTime,
	) -> Self {
		let lifetime = Duration::seconds(i64::try_from(expires_in).unwrap_or(i64::MAX));

		Self {
			access_token: TokenSecret::new(access_token),
			token_type: token_type.into(),
			expires_in,
			issued_at,
			expires_at: issued_at + lifetime,
		}
	}

	/// Returns `true` if the credential is usable at `instant`, i.e. strictly before
	/// `expires_at - EXPIRY_MARGIN`.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at - EXPIRY_MARGIN
	}

	/// Convenience helper that checks usability against the current UTC instant.
	pub fn is_usable(&self) -> bool {
		self.is_usable_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_margin_boundary() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::issued("token", "Bearer", 3_600, issued);
		let expiry = macros::datetime!(2025-01-01 01:00 UTC);

		assert_eq!(credential.expires_at, expiry);
		assert!(credential.is_usable_at(expiry - Duration::seconds(301)));
		assert!(!credential.is_usable_at(expiry - Duration::seconds(300)));
		assert!(!credential.is_usable_at(expiry - Duration::seconds(299)));
	}

	#[test]
	fn freshly_issued_credential_is_usable() {
		let credential = Credential::issued("token", "Bearer", 3_600, OffsetDateTime::now_utc());

		assert!(credential.is_usable());

		let short_lived = Credential::issued("token", "Bearer", 60, OffsetDateTime::now_utc());

		assert!(!short_lived.is_usable(), "A lifetime inside the margin is never usable.");
	}

	#[test]
	fn debug_redacts_token_material() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::issued("top-secret", "Bearer", 60, issued);
		let rendered = format!("{credential:?}");

		assert!(!rendered.contains("top-secret"));
		assert!(rendered.contains("<redacted>"));
	}
}
