//! Transport primitives shared by the credential providers and API clients.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default build disables redirect following: token endpoints return results
/// directly, and the one legitimate redirect in this domain, the exchange endpoint's
/// `307 Temporary Redirect`, is followed manually, exactly once, by the provider itself.
/// Configure any custom [`ReqwestClient`] passed to [`HttpClient::with_client`] the same
/// way, or the manual hop turns into double-following.
///
/// The wrapper is stateless from the callers' perspective and is meant to be cloned and
/// shared across every provider and client in the process.
#[derive(Clone, Debug)]
pub struct HttpClient(ReqwestClient);
impl HttpClient {
	/// Builds the default transport with redirect following disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for HttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for HttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
