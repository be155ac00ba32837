//! Cached client-credentials acquisition against the identity provider.
//!
//! [`EntraTokenProvider`] owns exactly one credential slot guarded by an async mutex.
//! The lock is held across both the cache inspection and the network round trip, so a
//! thundering herd of concurrent cache-miss callers collapses into a single acquisition:
//! whichever caller wins the lock refreshes, and every waiter then observes the freshly
//! cached credential. Dropping a call's future while it waits on the lock or on the
//! network releases the guard without touching the slot.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	config::EntraConfig,
	error::{AcquisitionError, TransportError},
	http::HttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::credential_from_slice,
};

/// Credential cached together with the scope it was minted for.
///
/// A request for a different scope is a cache miss; tokens minted for one audience are
/// never served to another.
#[derive(Debug)]
struct ScopedCredential {
	scope: String,
	credential: Credential,
}

/// Acquires and caches client-credentials tokens from the identity provider.
///
/// Long-lived: construct once per process and share behind an [`Arc`]. All configuration
/// is validated when the [`EntraConfig`] is built.
#[derive(Debug)]
pub struct EntraTokenProvider {
	http: HttpClient,
	config: EntraConfig,
	slot: AsyncMutex<Option<ScopedCredential>>,
}
impl EntraTokenProvider {
	/// Creates a provider with an empty cache.
	pub fn new(http: HttpClient, config: EntraConfig) -> Self {
		Self { http, config, slot: AsyncMutex::new(None) }
	}

	/// Returns a bearer token for `scope`, falling back to the configured default scope.
	///
	/// Serves the cached credential when it matches the effective scope and is still
	/// inside its usability window; otherwise performs one form-encoded POST to the
	/// token endpoint. Failures leave the cache untouched, so the next call retries.
	pub async fn get_token(&self, scope: Option<&str>) -> Result<String> {
		const KIND: FlowKind = FlowKind::Acquire;

		let span = FlowSpan::new(KIND, "get_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.acquire(scope)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Unconditionally discards the cached credential.
	///
	/// Takes the same lock as [`get_token`](Self::get_token), so it is safe to call
	/// concurrently with in-flight acquisitions.
	pub async fn clear_cache(&self) {
		*self.slot.lock().await = None;
	}

	async fn acquire(&self, scope: Option<&str>) -> Result<String> {
		let scope = scope.unwrap_or(&self.config.default_scope);
		// Held across the cache check and the network round trip; concurrent cache-miss
		// callers serialize here and share the first refresh.
		let mut slot = self.slot.lock().await;

		if let Some(cached) = slot.as_ref()
			&& cached.scope == scope
			&& cached.credential.is_usable()
		{
			return Ok(cached.credential.access_token.expose().to_owned());
		}

		let issued_at = OffsetDateTime::now_utc();
		let response = self
			.http
			.post(self.config.token_endpoint())
			.form(&[
				("client_id", self.config.client_id.as_ref()),
				("client_secret", self.config.client_secret.expose()),
				("grant_type", "client_credentials"),
				("scope", scope),
			])
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(AcquisitionError::TokenEndpoint {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&body).into_owned(),
			}
			.into());
		}

		let credential = credential_from_slice(&body, issued_at)?;
		let token = credential.access_token.expose().to_owned();

		*slot = Some(ScopedCredential { scope: scope.to_owned(), credential });

		Ok(token)
	}
}
