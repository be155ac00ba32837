//! On-hand queries against the inventory-visibility index.

// self
use crate::{
	_prelude::*,
	api::{decode_json, read_success},
	error::TransportError,
	http::HttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{
		VisibilityTokenProvider,
		visibility::{API_VERSION, API_VERSION_HEADER},
	},
};

/// Per-dimension filters for an on-hand index query. Empty lists mean no restriction on
/// that dimension.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OnHandFilters {
	/// Legal entities to search.
	#[serde(rename = "OrganizationId", default)]
	pub organization_id: Vec<String>,
	/// Products to search.
	#[serde(rename = "ProductId", default)]
	pub product_id: Vec<String>,
	/// Sites to search.
	#[serde(rename = "SiteId", default)]
	pub site_id: Vec<String>,
	/// Warehouse locations to search.
	#[serde(rename = "LocationId", default)]
	pub location_id: Vec<String>,
	/// License plates to search.
	#[serde(rename = "LicensePlateId", default)]
	pub license_plate_id: Vec<String>,
}

/// On-hand index query request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OnHandQuery {
	/// Dimension mapping source, e.g. `fno`.
	#[serde(rename = "dimensionDataSource", skip_serializing_if = "Option::is_none")]
	pub dimension_data_source: Option<String>,
	/// Per-dimension filters.
	#[serde(rename = "filters")]
	pub filters: OnHandFilters,
	/// Dimensions to group the result rows by.
	#[serde(rename = "groupByValues", default)]
	pub group_by_values: Vec<String>,
	/// Includes negative quantities when set.
	#[serde(rename = "returnNegative", default)]
	pub return_negative: bool,
}

/// One on-hand result row.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OnHandRecord {
	/// Product the row describes.
	#[serde(rename = "productId")]
	pub product_id: String,
	/// Dimension values the row is grouped by.
	#[serde(rename = "dimensions", default)]
	pub dimensions: HashMap<String, String>,
	/// Quantities keyed by data source, then by physical measure.
	#[serde(rename = "quantities", default)]
	pub quantities: HashMap<String, HashMap<String, f64>>,
}

/// Client for the inventory-visibility on-hand index.
///
/// Every call attaches the exchanged bearer token from [`VisibilityTokenProvider`] and
/// the service's required version header.
#[derive(Debug)]
pub struct OnHandClient {
	http: HttpClient,
	tokens: Arc<VisibilityTokenProvider>,
}
impl OnHandClient {
	/// Creates a client reusing the provider's service endpoints and environment.
	pub fn new(http: HttpClient, tokens: Arc<VisibilityTokenProvider>) -> Self {
		Self { http, tokens }
	}

	/// Runs an on-hand index query and returns the matching rows.
	pub async fn query_on_hand(&self, query: &OnHandQuery) -> Result<Vec<OnHandRecord>> {
		const KIND: FlowKind = FlowKind::Query;

		let span = FlowSpan::new(KIND, "query_on_hand");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let endpoint = format!(
					"{}/api/environment/{}/onhand/indexquery",
					self.tokens.config().service_url.as_str().trim_end_matches('/'),
					self.tokens.environment(),
				);
				let token = self.tokens.get_token().await?;
				let response = self
					.http
					.post(endpoint)
					.bearer_auth(token)
					.header(API_VERSION_HEADER, API_VERSION)
					.json(query)
					.send()
					.await
					.map_err(TransportError::from)?;
				let body = read_success(response).await?;

				decode_json(&body)
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
	fn query_serializes_wire_names() {
		let query = OnHandQuery {
			filters: OnHandFilters {
				organization_id: vec!["usmf".into()],
				product_id: vec!["A0001".into()],
				..Default::default()
			},
			group_by_values: vec!["SiteId".into(), "LocationId".into()],
			return_negative: true,
			..Default::default()
		};
		let rendered = serde_json::to_value(&query).expect("Query should serialize.");

		assert_eq!(rendered["filters"]["OrganizationId"][0], "usmf");
		assert_eq!(rendered["filters"]["ProductId"][0], "A0001");
		assert_eq!(rendered["groupByValues"][1], "LocationId");
		assert_eq!(rendered["returnNegative"], true);
		assert!(rendered.get("dimensionDataSource").is_none());
	}

	#[test]
	fn record_decodes_nested_quantities() {
		let record: OnHandRecord = serde_json::from_str(
			r#"{
				"productId": "A0001",
				"dimensions": {"SiteId": "1", "LocationId": "11"},
				"quantities": {"fno": {"availphysical": 12.5, "onordered": 2.0}}
			}"#,
		)
		.expect("Record should decode.");

		assert_eq!(record.product_id, "A0001");
		assert_eq!(record.dimensions["SiteId"], "1");
		assert_eq!(record.quantities["fno"]["availphysical"], 12.5);
	}
}
