//! Async integration toolkit for a Finance & Operations ERP: cached Entra ID service
//! credentials, OData queries, shop-floor command messaging, and inventory-visibility
//! lookups in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod obs;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{EntraConfig, OperationsConfig},
		http::HttpClient,
		provider::EntraTokenProvider,
	};

	/// Builds an [`EntraConfig`] whose authority points at a mock server URL.
	pub fn mock_entra_config(authority: &str) -> EntraConfig {
		EntraConfig::new("tenant-mock", "client-mock", "secret-mock")
			.expect("Mock Entra config should validate.")
			.with_authority(
				Url::parse(authority).expect("Mock authority URL should parse successfully."),
			)
	}

	/// Builds an [`OperationsConfig`] rooted at a mock server URL.
	pub fn mock_operations_config(base_url: &str) -> OperationsConfig {
		OperationsConfig::new("env-mock", base_url, "usmf")
			.expect("Mock operations config should validate.")
	}

	/// Builds an [`EntraTokenProvider`] wired to a mock authority.
	pub fn mock_entra_provider(authority: &str) -> Arc<EntraTokenProvider> {
		let http = HttpClient::new().expect("HTTP client should build for tests.");

		Arc::new(EntraTokenProvider::new(http, mock_entra_config(authority)))
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
