//! Credential providers: cached client-credentials acquisition, environment scope
//! derivation, and the visibility token exchange.

pub mod entra;
pub mod operations;
pub mod visibility;

pub use entra::*;
pub use operations::*;
pub use visibility::*;

// self
use crate::{_prelude::*, auth::Credential, error::MalformedResponseError};

/// Wire shape shared by the identity token endpoint and the exchange endpoint.
#[derive(Debug, Deserialize)]
struct TokenWireResponse {
	#[serde(default = "default_token_type")]
	token_type: String,
	expires_in: u64,
	access_token: String,
}

fn default_token_type() -> String {
	"Bearer".into()
}

/// Decodes a success-status token response body into a [`Credential`].
///
/// A body that is not the expected JSON document, or that carries a blank access token,
/// is a malformed response; nothing should be cached from it.
fn credential_from_slice(bytes: &[u8], issued_at: OffsetDateTime) -> Result<Credential> {
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);
	let wire: TokenWireResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| MalformedResponseError::Json { source })?;

	if wire.access_token.trim().is_empty() {
		return Err(MalformedResponseError::MissingAccessToken.into());
	}

	Ok(Credential::issued(wire.access_token, wire.token_type, wire.expires_in, issued_at))
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn wire_response_decodes_with_defaulted_token_type() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = credential_from_slice(
			br#"{"access_token":"abc","expires_in":120}"#,
			issued,
		)
		.expect("Minimal token response should decode.");

		assert_eq!(credential.token_type, "Bearer");
		assert_eq!(credential.expires_at, issued + Duration::seconds(120));
	}

	#[test]
	fn blank_access_token_is_malformed() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let err = credential_from_slice(
			br#"{"access_token":"  ","token_type":"Bearer","expires_in":3600}"#,
			issued,
		)
		.expect_err("Blank access token must be rejected.");

		assert!(matches!(
			err,
			Error::MalformedResponse(MalformedResponseError::MissingAccessToken),
		));
	}

	#[test]
	fn non_json_body_is_malformed() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let err = credential_from_slice(b"<html>oops</html>", issued)
			.expect_err("HTML body must be rejected.");

		assert!(matches!(err, Error::MalformedResponse(MalformedResponseError::Json { .. })));
	}
}
