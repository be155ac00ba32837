//! Typed queries against the environment's tabular data endpoint.
//!
//! Query options are assembled with [`ODataQuery`] and percent-encoded through
//! [`Url`]'s query machinery; entity DTOs mirror the wire names of the data entities
//! they project.

// self
use crate::{
	_prelude::*,
	api::{decode_json, read_success},
	error::TransportError,
	http::HttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::OperationsTokenProvider,
};

const DATA_PATH: &str = "/data";

/// Builder for the `$filter`/`$select`/`$expand`/`$top` query options.
#[derive(Clone, Debug, Default)]
pub struct ODataQuery {
	filter: Option<String>,
	select: Vec<String>,
	expand: Vec<String>,
	top: Option<u32>,
}
impl ODataQuery {
	/// Creates an empty query.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the `$filter` expression.
	pub fn filter(mut self, expression: impl Into<String>) -> Self {
		self.filter = Some(expression.into());

		self
	}

	/// Conjoins another clause onto the `$filter` expression with `and`.
	pub fn and_filter(mut self, clause: impl AsRef<str>) -> Self {
		self.filter = Some(match self.filter.take() {
			Some(existing) => format!("{existing} and {}", clause.as_ref()),
			None => clause.as_ref().to_owned(),
		});

		self
	}

	/// Restricts the projection to the named fields (`$select`).
	pub fn select<I>(mut self, fields: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.select.extend(fields.into_iter().map(Into::into));

		self
	}

	/// Expands the named navigation properties (`$expand`).
	pub fn expand<I>(mut self, properties: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.expand.extend(properties.into_iter().map(Into::into));

		self
	}

	/// Caps the result set size (`$top`).
	pub fn top(mut self, count: u32) -> Self {
		self.top = Some(count);

		self
	}

	/// Appends the configured options to `url` as encoded query pairs.
	pub fn apply(&self, url: &mut Url) {
		if self.filter.is_none()
			&& self.select.is_empty()
			&& self.expand.is_empty()
			&& self.top.is_none()
		{
			return;
		}

		let mut pairs = url.query_pairs_mut();

		if let Some(filter) = &self.filter {
			pairs.append_pair("$filter", filter);
		}
		if !self.select.is_empty() {
			pairs.append_pair("$select", &self.select.join(","));
		}
		if !self.expand.is_empty() {
			pairs.append_pair("$expand", &self.expand.join(","));
		}
		if let Some(top) = self.top {
			pairs.append_pair("$top", &top.to_string());
		}
	}
}

/// One page of entity rows as returned by the data endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::Deserialize<'de>"))]
pub struct ODataPage<T> {
	/// Metadata context URL.
	#[serde(rename = "@odata.context", default)]
	pub context: Option<String>,
	/// Entity rows.
	#[serde(default)]
	pub value: Vec<T>,
}

/// Production order header projection.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductionOrderHeader {
	/// Legal entity the order belongs to.
	#[serde(rename = "dataAreaId", default)]
	pub data_area_id: String,
	/// Order number, the entity key within a company.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Finished-good item number.
	#[serde(rename = "ItemNumber", default)]
	pub item_number: String,
	/// Lifecycle status label.
	#[serde(rename = "ProductionOrderStatus", default)]
	pub production_order_status: String,
	/// Descriptive order name.
	#[serde(rename = "ProductionOrderName", default)]
	pub production_order_name: Option<String>,
	/// Quantity currently scheduled.
	#[serde(rename = "ScheduledQuantity", default)]
	pub scheduled_quantity: f64,
	/// Quantity estimated at release.
	#[serde(rename = "EstimatedQuantity", default)]
	pub estimated_quantity: f64,
	/// Quantity already started.
	#[serde(rename = "StartedQuantity", default)]
	pub started_quantity: f64,
	/// Quantity still to report as finished.
	#[serde(rename = "RemainingReportAsFinishedQuantity", default)]
	pub remaining_report_as_finished_quantity: f64,
	/// Scheduled start date.
	#[serde(rename = "ScheduledStartDate", default)]
	pub scheduled_start_date: Option<String>,
	/// Scheduled end date.
	#[serde(rename = "ScheduledEndDate", default)]
	pub scheduled_end_date: Option<String>,
	/// Actual start date, if started.
	#[serde(rename = "StartedDate", default)]
	pub started_date: Option<String>,
	/// Production site.
	#[serde(rename = "ProductionSiteId", default)]
	pub production_site_id: Option<String>,
	/// Production warehouse.
	#[serde(rename = "ProductionWarehouseId", default)]
	pub production_warehouse_id: Option<String>,
}

/// Bill-of-material line projection for one production order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductionOrderBomLine {
	/// Legal entity the line belongs to.
	#[serde(rename = "dataAreaId", default)]
	pub data_area_id: String,
	/// Owning order number.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Line number within the order's BOM.
	#[serde(rename = "LineNumber", default)]
	pub line_number: f64,
	/// Component item number.
	#[serde(rename = "ItemNumber", default)]
	pub item_number: String,
	/// Per-unit BOM quantity.
	#[serde(rename = "BOMLineQuantity", default)]
	pub bom_line_quantity: f64,
	/// Unit the BOM quantity is expressed in.
	#[serde(rename = "BOMLineUnitSymbol", default)]
	pub bom_line_unit_symbol: Option<String>,
	/// Estimated inventory consumption.
	#[serde(rename = "EstimatedInventoryQuantity", default)]
	pub estimated_inventory_quantity: f64,
	/// Remaining inventory consumption.
	#[serde(rename = "RemainingInventoryQuantity", default)]
	pub remaining_inventory_quantity: f64,
}

/// Route operation projection for one production order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductionOrderRouteOperation {
	/// Legal entity the operation belongs to.
	#[serde(rename = "dataAreaId", default)]
	pub data_area_id: String,
	/// Owning order number.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Operation number within the route.
	#[serde(rename = "OperationNumber", default)]
	pub operation_number: i32,
	/// Operation identifier.
	#[serde(rename = "OperationId", default)]
	pub operation_id: Option<String>,
	/// Process time per lot.
	#[serde(rename = "ProcessTime", default)]
	pub process_time: f64,
	/// Setup time per lot.
	#[serde(rename = "SetupTime", default)]
	pub setup_time: f64,
	/// Scheduled operation start date.
	#[serde(rename = "ScheduledFromDate", default)]
	pub scheduled_from_date: Option<String>,
	/// Scheduled operation end date.
	#[serde(rename = "ScheduledEndDate", default)]
	pub scheduled_end_date: Option<String>,
}

/// Released product projection.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReleasedProduct {
	/// Legal entity the product is released in.
	#[serde(rename = "dataAreaId", default)]
	pub data_area_id: String,
	/// Released item number.
	#[serde(rename = "ItemNumber", default)]
	pub item_number: String,
	/// Shared product number.
	#[serde(rename = "ProductNumber")]
	pub product_number: String,
	/// Display name.
	#[serde(rename = "ProductName", default)]
	pub product_name: Option<String>,
	/// Product type label.
	#[serde(rename = "ProductType", default)]
	pub product_type: Option<String>,
	/// Search name.
	#[serde(rename = "SearchName", default)]
	pub search_name: Option<String>,
	/// Inventory unit.
	#[serde(rename = "InventoryUnitSymbol", default)]
	pub inventory_unit_symbol: Option<String>,
	/// BOM unit.
	#[serde(rename = "BOMUnitSymbol", default)]
	pub bom_unit_symbol: Option<String>,
}

/// Client for the environment's tabular data endpoint.
///
/// Every operation scopes its filter to the configured company and attaches a bearer
/// token from the shared [`OperationsTokenProvider`].
#[derive(Debug)]
pub struct ODataClient {
	http: HttpClient,
	tokens: Arc<OperationsTokenProvider>,
}
impl ODataClient {
	/// Creates a client reusing the provider's environment configuration.
	pub fn new(http: HttpClient, tokens: Arc<OperationsTokenProvider>) -> Self {
		Self { http, tokens }
	}

	/// Lists production order headers matching `query`, scoped to the company.
	pub async fn production_orders(
		&self,
		query: ODataQuery,
	) -> Result<Vec<ProductionOrderHeader>> {
		let query = query.and_filter(self.company_clause());

		self.fetch_page("ProductionOrderHeaders", query).await
	}

	/// Lists BOM lines for one production order.
	pub async fn bom_lines(&self, order_number: &str) -> Result<Vec<ProductionOrderBomLine>> {
		let query = ODataQuery::new()
			.filter(self.company_clause())
			.and_filter(format!("ProductionOrderNumber eq '{order_number}'"));

		self.fetch_page("ProductionOrderBillOfMaterialLines", query).await
	}

	/// Lists route operations for one production order.
	pub async fn route_operations(
		&self,
		order_number: &str,
	) -> Result<Vec<ProductionOrderRouteOperation>> {
		let query = ODataQuery::new()
			.filter(self.company_clause())
			.and_filter(format!("ProductionOrderNumber eq '{order_number}'"));

		self.fetch_page("ProductionOrderRouteOperations", query).await
	}

	/// Looks up one released product by product number.
	pub async fn released_product(
		&self,
		product_number: &str,
	) -> Result<Option<ReleasedProduct>> {
		let query = ODataQuery::new()
			.filter(format!("ProductNumber eq '{product_number}'"))
			.and_filter(self.company_clause())
			.top(1);
		let rows: Vec<ReleasedProduct> = self.fetch_page("ReleasedProductsV2", query).await?;

		Ok(rows.into_iter().next())
	}

	fn company_clause(&self) -> String {
		format!("dataAreaId eq '{}'", self.tokens.config().company)
	}

	fn entity_url(&self, entity: &str, query: &ODataQuery) -> Result<Url> {
		let config = self.tokens.config();
		let mut url = Url::parse(&format!(
			"{}{DATA_PATH}/{entity}",
			config.base_url.as_str().trim_end_matches('/')
		))
		.map_err(|source| crate::error::ConfigError::InvalidUrl { source })?;

		query.apply(&mut url);

		Ok(url)
	}

	async fn fetch_page<T>(&self, entity: &'static str, query: ODataQuery) -> Result<Vec<T>>
	where
		T: serde::de::DeserializeOwned,
	{
		const KIND: FlowKind = FlowKind::Query;

		let span = FlowSpan::new(KIND, "fetch_page");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.entity_url(entity, &query)?;
				let token = self.tokens.get_token().await?;
				let response = self
					.http
					.get(url)
					.bearer_auth(token)
					.header(reqwest::header::ACCEPT, "application/json")
					.send()
					.await
					.map_err(TransportError::from)?;
				let body = read_success(response).await?;
				let page: ODataPage<T> = decode_json(&body)?;

				Ok(page.value)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn query_options_encode_into_url() {
		let mut url = Url::parse("https://contoso.example/data/ProductionOrderHeaders")
			.expect("Fixture URL should parse.");
		let query = ODataQuery::new()
			.filter("dataAreaId eq 'usmf'")
			.and_filter("ProductionOrderNumber eq 'P000123'")
			.select(["ProductionOrderNumber", "ItemNumber"])
			.expand(["ProductionOrderHeaderLines"])
			.top(10);

		query.apply(&mut url);

		let rendered = url.as_str();

		assert!(rendered.contains(
			"%24filter=dataAreaId+eq+%27usmf%27+and+ProductionOrderNumber+eq+%27P000123%27"
		));
		assert!(rendered.contains("%24select=ProductionOrderNumber%2CItemNumber"));
		assert!(rendered.contains("%24expand=ProductionOrderHeaderLines"));
		assert!(rendered.contains("%24top=10"));
	}

	#[test]
	fn and_filter_without_base_starts_fresh() {
		let query = ODataQuery::new().and_filter("ItemNumber eq 'A0001'");
		let mut url = Url::parse("https://contoso.example/data/X").expect("URL should parse.");

		query.apply(&mut url);

		assert_eq!(url.query(), Some("%24filter=ItemNumber+eq+%27A0001%27"));
	}

	#[test]
	fn page_defaults_to_empty_rows() {
		let page: ODataPage<ProductionOrderHeader> =
			serde_json::from_str("{}").expect("Empty page should decode.");

		assert!(page.context.is_none());
		assert!(page.value.is_empty());
	}

	#[test]
	fn entity_rows_decode_from_wire_names() {
		let row: ProductionOrderHeader = serde_json::from_str(
			r#"{
				"dataAreaId": "usmf",
				"ProductionOrderNumber": "P000123",
				"ItemNumber": "A0001",
				"ProductionOrderStatus": "Started",
				"ScheduledQuantity": 10.0,
				"StartedQuantity": 4.0
			}"#,
		)
		.expect("Header row should decode.");

		assert_eq!(row.production_order_number, "P000123");
		assert_eq!(row.production_order_status, "Started");
		assert_eq!(row.started_quantity, 4.0);
	}
}
