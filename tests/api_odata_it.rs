// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use finops_connect::{
	api::{ODataClient, ODataQuery},
	config::{EntraConfig, OperationsConfig},
	error::{ApiError, Error},
	http::HttpClient,
	provider::{EntraTokenProvider, OperationsTokenProvider},
	url::Url,
};

/// Wires an OData client whose environment and authority both live on `server`.
fn build_client(server: &MockServer) -> ODataClient {
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

	ODataClient::new(http, tokens)
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
async fn production_orders_scope_the_company_filter() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mock_identity(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/data/ProductionOrderHeaders")
				.query_param(
					"$filter",
					"ProductionOrderStatus eq 'Started' and dataAreaId eq 'usmf'",
				)
				.query_param("$top", "5")
				.header("authorization", "Bearer TOK-OPS");
			then.status(200).header("content-type", "application/json").body(
				"{\"@odata.context\":\"https://contoso.example/data/$metadata#ProductionOrderHeaders\",\"value\":[{\"dataAreaId\":\"usmf\",\"ProductionOrderNumber\":\"P000123\",\"ItemNumber\":\"A0001\",\"ProductionOrderStatus\":\"Started\",\"StartedQuantity\":4.0}]}",
			);
		})
		.await;
	let orders = client
		.production_orders(ODataQuery::new().filter("ProductionOrderStatus eq 'Started'").top(5))
		.await
		.expect("Query should succeed.");

	assert_eq!(orders.len(), 1);
	assert_eq!(orders[0].production_order_number, "P000123");
	assert_eq!(orders[0].started_quantity, 4.0);

	mock.assert_async().await;
}

#[tokio::test]
async fn bom_lines_filter_on_the_order_number() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mock_identity(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/data/ProductionOrderBillOfMaterialLines")
				.query_param(
					"$filter",
					"dataAreaId eq 'usmf' and ProductionOrderNumber eq 'P000123'",
				);
			then.status(200).header("content-type", "application/json").body(
				"{\"value\":[{\"dataAreaId\":\"usmf\",\"ProductionOrderNumber\":\"P000123\",\"ItemNumber\":\"M0001\",\"LineNumber\":1.0,\"BOMLineQuantity\":2.0}]}",
			);
		})
		.await;
	let lines = client.bom_lines("P000123").await.expect("Query should succeed.");

	assert_eq!(lines.len(), 1);
	assert_eq!(lines[0].item_number, "M0001");
	assert_eq!(lines[0].bom_line_quantity, 2.0);

	mock.assert_async().await;
}

#[tokio::test]
async fn released_product_lookup_returns_none_on_empty_page() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mock_identity(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/data/ReleasedProductsV2")
				.query_param("$filter", "ProductNumber eq 'GHOST' and dataAreaId eq 'usmf'")
				.query_param("$top", "1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"value\":[]}");
		})
		.await;
	let product = client.released_product("GHOST").await.expect("Query should succeed.");

	assert!(product.is_none());

	mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_maps_to_api_error() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);

	mock_identity(&server).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/data/ProductionOrderRouteOperations");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"error\":{\"message\":\"boom\"}}");
		})
		.await;
	let err = client
		.route_operations("P000123")
		.await
		.expect_err("HTTP 500 must surface to the caller.");

	match err {
		Error::Api(ApiError::Status { status, body }) => {
			assert_eq!(status, 500);
			assert!(body.contains("boom"));
		},
		other => panic!("Expected an API status error, got {other:?}."),
	}

	mock.assert_async().await;
}
