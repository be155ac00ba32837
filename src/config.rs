//! Typed configuration surfaces, validated once at construction.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, CompanyId, EnvironmentId, TenantId, TokenSecret},
	error::ConfigError,
};

/// Default identity authority the token endpoint is rooted at.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
/// Default scope requested when a caller does not override it.
pub const DEFAULT_SCOPE: &str = "https://inventoryservice.operations365.dynamics.com/.default";
/// Default exchange (security) service base URL.
pub const DEFAULT_SECURITY_SERVICE_URL: &str = "https://securityservice.operations365.dynamics.com";
/// Default inventory-visibility service base URL.
pub const DEFAULT_SERVICE_URL: &str = "https://inventoryservice.operations365.dynamics.com";

/// Settings for client-credentials acquisition against the identity provider.
#[derive(Clone, Debug)]
pub struct EntraConfig {
	/// Directory (tenant) the application is registered in.
	pub tenant: TenantId,
	/// Application (client) identifier.
	pub client_id: ClientId,
	/// Application secret presented alongside the client identifier.
	pub client_secret: TokenSecret,
	/// Scope used when the caller does not supply one.
	pub default_scope: String,
	/// Identity authority base URL.
	pub authority: Url,
}
impl EntraConfig {
	/// Validates and assembles the acquisition settings.
	///
	/// Fails with a [`ConfigError`] if the tenant, client identifier, or client secret is
	/// missing or blank.
	pub fn new(
		tenant: impl AsRef<str>,
		client_id: impl AsRef<str>,
		client_secret: impl AsRef<str>,
	) -> Result<Self, ConfigError> {
		let tenant = TenantId::new(tenant)?;
		let client_id = ClientId::new(client_id)?;
		let secret_view = client_secret.as_ref();

		if secret_view.trim().is_empty() {
			return Err(ConfigError::MissingSetting { name: "client_secret" });
		}

		let authority =
			Url::parse(DEFAULT_AUTHORITY).map_err(|source| ConfigError::InvalidUrl { source })?;

		Ok(Self {
			tenant,
			client_id,
			client_secret: TokenSecret::new(secret_view),
			default_scope: DEFAULT_SCOPE.into(),
			authority,
		})
	}

	/// Overrides the default scope.
	pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
		self.default_scope = scope.into();

		self
	}

	/// Overrides the identity authority base URL.
	pub fn with_authority(mut self, authority: Url) -> Self {
		self.authority = authority;

		self
	}

	/// Full token endpoint URL for this tenant.
	pub fn token_endpoint(&self) -> String {
		format!("{}/{}/oauth2/v2.0/token", self.authority.as_str().trim_end_matches('/'), self.tenant)
	}
}

/// Settings describing one ERP environment.
#[derive(Clone, Debug)]
pub struct OperationsConfig {
	/// Deployment environment identifier, also the exchange context.
	pub environment: EnvironmentId,
	/// Environment base URL the data and message endpoints hang off.
	pub base_url: Url,
	/// Legal entity scoping queries and commands.
	pub company: CompanyId,
}
impl OperationsConfig {
	/// Validates and assembles the environment settings.
	pub fn new(
		environment: impl AsRef<str>,
		base_url: impl AsRef<str>,
		company: impl AsRef<str>,
	) -> Result<Self, ConfigError> {
		let environment = EnvironmentId::new(environment)?;
		let company = CompanyId::new(company)?;
		let base_url =
			Url::parse(base_url.as_ref()).map_err(|source| ConfigError::InvalidUrl { source })?;

		if base_url.host_str().is_none() {
			return Err(ConfigError::BaseUrlMissingHost);
		}

		Ok(Self { environment, base_url, company })
	}

	/// Resource scope derived from the environment base URL, `{scheme}://{host}/.default`.
	pub fn resource_scope(&self) -> String {
		format!(
			"{}://{}/.default",
			self.base_url.scheme(),
			self.base_url.host_str().unwrap_or_default()
		)
	}
}

/// Settings for the inventory-visibility service and its token exchange endpoint.
#[derive(Clone, Debug)]
pub struct VisibilityConfig {
	/// Exchange (security) service base URL.
	pub security_service_url: Url,
	/// Inventory-visibility API base URL.
	pub service_url: Url,
}
impl VisibilityConfig {
	/// Assembles the default service endpoints.
	pub fn new() -> Result<Self, ConfigError> {
		let security_service_url = Url::parse(DEFAULT_SECURITY_SERVICE_URL)
			.map_err(|source| ConfigError::InvalidUrl { source })?;
		let service_url =
			Url::parse(DEFAULT_SERVICE_URL).map_err(|source| ConfigError::InvalidUrl { source })?;

		Ok(Self { security_service_url, service_url })
	}

	/// Overrides the exchange service base URL.
	pub fn with_security_service_url(mut self, url: Url) -> Self {
		self.security_service_url = url;

		self
	}

	/// Overrides the visibility API base URL.
	pub fn with_service_url(mut self, url: Url) -> Self {
		self.service_url = url;

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn entra_config_validates_required_settings() {
		assert!(EntraConfig::new("", "c1", "s1").is_err());
		assert!(EntraConfig::new("t1", "", "s1").is_err());
		assert!(matches!(
			EntraConfig::new("t1", "c1", "  "),
			Err(ConfigError::MissingSetting { name: "client_secret" }),
		));

		let config = EntraConfig::new("t1", "c1", "s1").expect("Config fixture should validate.");

		assert_eq!(config.default_scope, DEFAULT_SCOPE);
		assert_eq!(config.token_endpoint(), "https://login.microsoftonline.com/t1/oauth2/v2.0/token");
	}

	#[test]
	fn entra_config_authority_override_feeds_token_endpoint() {
		let config = EntraConfig::new("t1", "c1", "s1")
			.expect("Config fixture should validate.")
			.with_authority(Url::parse("https://id.example:8443/").expect("URL should parse."));

		assert_eq!(config.token_endpoint(), "https://id.example:8443/t1/oauth2/v2.0/token");
	}

	#[test]
	fn operations_config_derives_resource_scope() {
		let config = OperationsConfig::new("env1", "https://contoso.operations.dynamics.com", "usmf")
			.expect("Config fixture should validate.");

		assert_eq!(config.resource_scope(), "https://contoso.operations.dynamics.com/.default");
		assert!(OperationsConfig::new("env1", "not a url", "usmf").is_err());
	}

	#[test]
	fn visibility_config_defaults_to_public_endpoints() {
		let config = VisibilityConfig::new().expect("Defaults should parse.");

		assert_eq!(config.security_service_url.as_str(), format!("{DEFAULT_SECURITY_SERVICE_URL}/"));
		assert_eq!(config.service_url.as_str(), format!("{DEFAULT_SERVICE_URL}/"));
	}
}
