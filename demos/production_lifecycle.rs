//! Walks a production order through start → report-as-finished → end by sending
//! discriminated command envelopes to a mocked message service.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use finops_connect::{
	api::{
		EndProductionOrder, MessageServiceClient, ReportAsFinished, ReportFinishedLine,
		StartProductionOrder,
	},
	config::{EntraConfig, OperationsConfig},
	http::HttpClient,
	provider::{EntraTokenProvider, OperationsTokenProvider},
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
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;

	let command_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/services/SysMessageServices/SysMessageService/SendMessage");
			then.status(200).header("content-type", "application/json").body("{\"$id\":\"1\"}");
		})
		.await;
	let http = HttpClient::new()?;
	let entra_config = EntraConfig::new("tenant-demo", "client-demo", "super-secret")?
		.with_authority(Url::parse(&server.base_url())?);
	let entra = Arc::new(EntraTokenProvider::new(http.clone(), entra_config));
	let operations = OperationsConfig::new("env-demo", server.base_url(), "usmf")?;
	let tokens = Arc::new(OperationsTokenProvider::new(entra, operations));
	let client = MessageServiceClient::new(http, tokens);
	let order = "P000123";

	client
		.start_production_order(&StartProductionOrder {
			production_order_number: order.into(),
			started_quantity: Some(10.0),
			..Default::default()
		})
		.await?;
	println!("Started {order}.");

	client
		.report_as_finished(&ReportAsFinished {
			production_order_number: order.into(),
			report_finished_lines: vec![ReportFinishedLine {
				reported_good_quantity: Some(10.0),
				end_job: Some("Yes".into()),
				..Default::default()
			}],
			..Default::default()
		})
		.await?;
	println!("Reported {order} as finished.");

	client
		.end_production_order(&EndProductionOrder {
			production_order_number: order.into(),
			..Default::default()
		})
		.await?;
	println!("Ended {order}.");

	command_mock.assert_calls_async(3).await;

	Ok(())
}
