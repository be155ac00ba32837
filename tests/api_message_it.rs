// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use finops_connect::{
	api::{EndProductionOrder, MessageServiceClient, ReportAsFinished, ReportFinishedLine,
		StartProductionOrder},
	config::{EntraConfig, OperationsConfig},
	error::{ApiError, Error},
	http::HttpClient,
	provider::{EntraTokenProvider, OperationsTokenProvider},
	url::Url,
};

const SEND_MESSAGE_PATH: &str = "/api/services/SysMessageServices/SysMessageService/SendMessage";

fn build_client(server: &MockServer) -> MessageServiceClient {
	let http = HttpClient::new().expect("HTTP client should build for tests.");
	let entra_config = EntraConfig::new("t1", "c1", "s1")
		.expect("Entra config fixture should validate.")
		.with_authority(
			Url::parse(&server.base_url()).expect("Mock authority URL should parse successfully."),
		);
	let entra = Arc::new(EntraTokenProvider::new(http.clone(), entra_config));
	let operations_config = OperationsConfig::new("env1", server.base_url(), "usmf")
		.expect("Operations config fixture should validate.");
	let tokens = Arc::new(OperationsTokenProvider::new(entra, operations_config));

	MessageServiceClient::new(http, tokens)
}

async fn mock_identity(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(POST).path("/t1/oauth2/v2.0/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"TOK-OPS\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
}

#[tokio::test]
async fn start_command_posts_the_discriminated_envelope() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mock_identity(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(SEND_MESSAGE_PATH)
				.header("authorization", "Bearer TOK-OPS")
				.body_includes("\"_companyId\":\"usmf\"")
				.body_includes("\"_messageQueue\":\"JmgMES3P\"")
				.body_includes("\"_messageType\":\"ProdProductionOrderStart\"")
				// The payload travels as an escaped JSON string inside the envelope.
				.body_includes("\\\"ProductionOrderNumber\\\":\\\"P000123\\\"");
			then.status(200).header("content-type", "application/json").body("{\"$id\":\"1\"}");
		})
		.await;

	client
		.start_production_order(&StartProductionOrder {
			production_order_number: "P000123".into(),
			started_quantity: Some(5.0),
			..Default::default()
		})
		.await
		.expect("Command should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn report_as_finished_carries_lines() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mock_identity(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(SEND_MESSAGE_PATH)
				.body_includes("\"_messageType\":\"ProdProductionOrderReportFinished\"")
				.body_includes("\\\"ReportedGoodQuantity\\\":3.0");
			then.status(200).header("content-type", "application/json").body("{\"$id\":\"1\"}");
		})
		.await;

	client
		.report_as_finished(&ReportAsFinished {
			production_order_number: "P000123".into(),
			report_finished_lines: vec![ReportFinishedLine {
				reported_good_quantity: Some(3.0),
				end_job: Some("Yes".into()),
				..Default::default()
			}],
			..Default::default()
		})
		.await
		.expect("Command should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn failed_command_surfaces_status_and_body() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mock_identity(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(SEND_MESSAGE_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"Message\":\"Order is already ended.\"}");
		})
		.await;
	let err = client
		.end_production_order(&EndProductionOrder {
			production_order_number: "P000123".into(),
			..Default::default()
		})
		.await
		.expect_err("HTTP 400 must surface to the caller.");

	match err {
		Error::Api(ApiError::Status { status, body }) => {
			assert_eq!(status, 400);
			assert!(body.contains("already ended"));
		},
		other => panic!("Expected an API status error, got {other:?}."),
	}

	mock.assert_async().await;
}
