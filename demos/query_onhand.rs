//! Runs the full visibility chain against mocks: primary acquisition, token exchange,
//! then an on-hand index query with the exchanged credential.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use finops_connect::{
	api::{OnHandClient, OnHandFilters, OnHandQuery},
	auth::EnvironmentId,
	config::{EntraConfig, VisibilityConfig},
	http::HttpClient,
	provider::{EntraTokenProvider, VisibilityTokenProvider},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/tenant-demo/oauth2/v2.0/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-assertion\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-visibility\",\"token_type\":\"Bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/environment/env-demo/onhand/indexquery");
			then.status(200).header("content-type", "application/json").body(
				"[{\"productId\":\"A0001\",\"dimensions\":{\"SiteId\":\"1\"},\"quantities\":{\"fno\":{\"availphysical\":42.0}}}]",
			);
		})
		.await;

	let http = HttpClient::new()?;
	let entra_config = EntraConfig::new("tenant-demo", "client-demo", "super-secret")?
		.with_authority(Url::parse(&server.base_url())?);
	let entra = Arc::new(EntraTokenProvider::new(http.clone(), entra_config));
	let base = Url::parse(&server.base_url())?;
	let visibility_config =
		VisibilityConfig::new()?.with_security_service_url(base.clone()).with_service_url(base);
	let tokens = Arc::new(VisibilityTokenProvider::new(
		http.clone(),
		entra,
		visibility_config,
		EnvironmentId::new("env-demo")?,
	));
	let client = OnHandClient::new(http, tokens);
	let records = client
		.query_on_hand(&OnHandQuery {
			filters: OnHandFilters {
				organization_id: vec!["usmf".into()],
				product_id: vec!["A0001".into()],
				..Default::default()
			},
			group_by_values: vec!["SiteId".into()],
			..Default::default()
		})
		.await?;

	for record in records {
		println!(
			"{}: {:?} -> {:?}.",
			record.product_id, record.dimensions, record.quantities,
		);
	}

	Ok(())
}
