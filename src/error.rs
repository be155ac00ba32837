//! Crate-level error types shared across credential providers and API clients.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem raised at construction.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint rejected an acquisition or exchange attempt.
	#[error(transparent)]
	Acquisition(#[from] AcquisitionError),
	/// Token endpoint accepted the request but returned an unusable payload.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Downstream API call failed.
	#[error(transparent)]
	Api(#[from] ApiError),
}

/// Configuration and validation failures raised while constructing providers or clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required setting was absent or blank.
	#[error("Required setting `{name}` is missing or blank.")]
	MissingSetting {
		/// Name of the offending setting.
		name: &'static str,
	},
	/// An identifier failed validation.
	#[error("Configured identifier is invalid.")]
	Identifier(#[from] crate::auth::IdentifierError),
	/// A configured URL cannot be parsed.
	#[error("Configured URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The environment base URL carries no host to derive a resource scope from.
	#[error("Environment base URL has no host.")]
	BaseUrlMissingHost,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Non-success responses from either token endpoint.
///
/// The status and raw body are preserved for diagnostics; nothing is cached when one of
/// these is raised, so the next call retries the acquisition.
#[derive(Debug, ThisError)]
pub enum AcquisitionError {
	/// Identity token endpoint returned a non-success status.
	#[error("Identity token endpoint returned HTTP {status}.")]
	TokenEndpoint {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Token exchange endpoint returned a non-success status.
	#[error("Token exchange endpoint returned HTTP {status}.")]
	Exchange {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
}

/// Success status but an unusable token payload.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// Response body was not the expected JSON document.
	#[error("Token endpoint returned malformed JSON.")]
	Json {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response parsed but the access token field was absent or blank.
	#[error("Token response is missing an access token.")]
	MissingAccessToken,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures reported by the downstream data and command APIs.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// API returned a non-success status.
	#[error("API request failed with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// API response body could not be decoded into the expected type.
	#[error("API response body could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Command payload could not be serialized for the envelope.
	#[error("Command payload could not be serialized.")]
	Encode {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
