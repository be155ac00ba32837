//! Two-step token exchange for the inventory-visibility API.
//!
//! The visibility service does not accept identity-provider tokens directly. The
//! provider first asks the shared [`EntraTokenProvider`] for a token minted against the
//! visibility application's fixed scope, then posts that token as a client assertion to
//! the security service, which answers with the access token the visibility API honors.
//! The exchanged credential is cached under its own slot and lock, fully independent of
//! the primary provider's cache; the two tokens are for different audiences.

// crates.io
use reqwest::{Response, StatusCode, header::LOCATION};
// self
use crate::{
	_prelude::*,
	auth::{Credential, EnvironmentId},
	config::{DEFAULT_SCOPE, VisibilityConfig},
	error::{AcquisitionError, TransportError},
	http::HttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{EntraTokenProvider, credential_from_slice},
};

/// Fixed scope of the visibility application the primary token is minted for. This is
/// not the caller-configurable default scope; every exchange uses exactly this value.
pub const VISIBILITY_APP_SCOPE: &str = "0cdb527f-a8d1-4bf8-9436-b352c68682b2/.default";
/// Version header required by the security service and the visibility API.
pub(crate) const API_VERSION_HEADER: &str = "Api-Version";
/// Version value expected by both services.
pub(crate) const API_VERSION: &str = "1.0";

/// Assertion body posted to the security service's `/token` endpoint.
#[derive(Clone, Serialize)]
struct ExchangeRequest {
	grant_type: &'static str,
	client_assertion_type: &'static str,
	client_assertion: String,
	scope: &'static str,
	context: String,
	context_type: &'static str,
}
impl ExchangeRequest {
	fn new(assertion: String, environment: &EnvironmentId) -> Self {
		Self {
			grant_type: "client_credentials",
			client_assertion_type: "aad_app",
			client_assertion: assertion,
			scope: DEFAULT_SCOPE,
			context: environment.to_string(),
			context_type: "finops-env",
		}
	}
}
impl Debug for ExchangeRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ExchangeRequest")
			.field("client_assertion", &"<redacted>")
			.field("context", &self.context)
			.finish()
	}
}

/// Exchanges primary tokens for visibility-API access tokens and caches the result.
#[derive(Debug)]
pub struct VisibilityTokenProvider {
	http: HttpClient,
	entra: Arc<EntraTokenProvider>,
	config: VisibilityConfig,
	environment: EnvironmentId,
	slot: AsyncMutex<Option<Credential>>,
}
impl VisibilityTokenProvider {
	/// Creates a provider with an empty cache.
	///
	/// The exchange URL and environment identifier are already validated by their types;
	/// construction cannot produce a half-configured provider.
	pub fn new(
		http: HttpClient,
		entra: Arc<EntraTokenProvider>,
		config: VisibilityConfig,
		environment: EnvironmentId,
	) -> Self {
		Self { http, entra, config, environment, slot: AsyncMutex::new(None) }
	}

	/// Returns a bearer token accepted by the visibility API.
	///
	/// Serves the cached exchanged credential while usable; otherwise runs the two-step
	/// exchange under the provider's lock. Failures leave the cache untouched.
	pub async fn get_token(&self) -> Result<String> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "get_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Unconditionally discards the cached exchanged credential. The primary provider's
	/// cache is not touched.
	pub async fn clear_cache(&self) {
		*self.slot.lock().await = None;
	}

	/// Environment identifier used as the exchange context.
	pub fn environment(&self) -> &EnvironmentId {
		&self.environment
	}

	/// Service endpoints this provider exchanges tokens for.
	pub fn config(&self) -> &VisibilityConfig {
		&self.config
	}

	async fn exchange(&self) -> Result<String> {
		// Same discipline as the primary provider: the lock spans the cache check, the
		// primary acquisition, and the exchange round trip(s).
		let mut slot = self.slot.lock().await;

		if let Some(credential) = slot.as_ref()
			&& credential.is_usable()
		{
			return Ok(credential.access_token.expose().to_owned());
		}

		let assertion = self.entra.get_token(Some(VISIBILITY_APP_SCOPE)).await?;
		let request = ExchangeRequest::new(assertion, &self.environment);
		let endpoint = format!(
			"{}/token",
			self.config.security_service_url.as_str().trim_end_matches('/')
		);
		let issued_at = OffsetDateTime::now_utc();
		let mut response = self.post_exchange(&endpoint, &request).await?;

		// The security service answers 307 when the environment is homed on another
		// regional host. Exactly one hop is followed; a redirect from the redirected
		// host falls through to normal status handling.
		if response.status() == StatusCode::TEMPORARY_REDIRECT
			&& let Some(location) =
				response.headers().get(LOCATION).and_then(|value| value.to_str().ok())
		{
			let location = location.to_owned();

			response = self.post_exchange(&location, &request).await?;
		}

		let status = response.status();
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(AcquisitionError::Exchange {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&body).into_owned(),
			}
			.into());
		}

		let credential = credential_from_slice(&body, issued_at)?;
		let token = credential.access_token.expose().to_owned();

		*slot = Some(credential);

		Ok(token)
	}

	async fn post_exchange(&self, endpoint: &str, request: &ExchangeRequest) -> Result<Response> {
		Ok(self
			.http
			.post(endpoint)
			.header(API_VERSION_HEADER, API_VERSION)
			.json(request)
			.send()
			.await
			.map_err(TransportError::from)?)
	}
}
