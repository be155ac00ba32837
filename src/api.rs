//! Bearer-authenticated clients for the ERP's data, command, and visibility APIs.

pub mod message;
pub mod odata;
pub mod onhand;

pub use message::*;
pub use odata::*;
pub use onhand::*;

// crates.io
use reqwest::Response;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ApiError, TransportError},
};

/// Drains a response body, mapping non-success statuses to [`ApiError::Status`].
pub(crate) async fn read_success(response: Response) -> Result<Vec<u8>> {
	let status = response.status();
	let body = response.bytes().await.map_err(TransportError::from)?;

	if !status.is_success() {
		return Err(ApiError::Status {
			status: status.as_u16(),
			body: String::from_utf8_lossy(&body).into_owned(),
		}
		.into());
	}

	Ok(body.to_vec())
}

/// Decodes a JSON body with path-aware diagnostics.
pub(crate) fn decode_json<T>(bytes: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	Ok(serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ApiError::Decode { source })?)
}
