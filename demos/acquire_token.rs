//! Demonstrates cached client-credentials acquisition: two calls, one network round
//! trip, both returning the same bearer token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use finops_connect::{
	config::EntraConfig,
	http::HttpClient,
	provider::EntraTokenProvider,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/tenant-demo/oauth2/v2.0/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let config = EntraConfig::new("tenant-demo", "client-demo", "super-secret")?
		.with_default_scope("https://erp.demo.example/.default")
		.with_authority(Url::parse(&server.base_url())?);
	let provider = Arc::new(EntraTokenProvider::new(HttpClient::new()?, config));
	let first = provider.get_token(None).await?;
	let second = provider.get_token(None).await?;

	println!("First call:  {first}.");
	println!("Second call: {second} (served from cache).");

	token_mock.assert_async().await;

	Ok(())
}
