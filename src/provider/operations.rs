//! Token provision for the ERP environment's own API surface (OData, message service).

// self
use crate::{_prelude::*, config::OperationsConfig, provider::EntraTokenProvider};

/// Derives the environment resource scope and delegates acquisition to the shared
/// [`EntraTokenProvider`], reusing its cache.
#[derive(Debug)]
pub struct OperationsTokenProvider {
	entra: Arc<EntraTokenProvider>,
	config: OperationsConfig,
}
impl OperationsTokenProvider {
	/// Creates a provider for the configured environment.
	pub fn new(entra: Arc<EntraTokenProvider>, config: OperationsConfig) -> Self {
		Self { entra, config }
	}

	/// Returns a bearer token scoped to the environment host, `{scheme}://{host}/.default`.
	pub async fn get_token(&self) -> Result<String> {
		self.entra.get_token(Some(&self.config.resource_scope())).await
	}

	/// Environment settings this provider serves.
	pub fn config(&self) -> &OperationsConfig {
		&self.config
	}
}
