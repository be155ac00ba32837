//! Command messages driving production-order lifecycle transitions.
//!
//! The message service accepts an envelope whose `_messageContent` field carries the
//! actual payload serialized as a JSON *string*, discriminated by `_messageType`. The
//! payload structs keep the wire's PascalCase names and omit unset optional fields so
//! the service falls back to its own defaulting rules.

// self
use crate::{
	_prelude::*,
	api::read_success,
	error::{ApiError, TransportError},
	http::HttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::OperationsTokenProvider,
};

const MESSAGE_SERVICE_PATH: &str =
	"/api/services/SysMessageServices/SysMessageService/SendMessage";

/// Queue the message service routes shop-floor messages through.
pub const DEFAULT_MESSAGE_QUEUE: &str = "JmgMES3P";

/// Message-type discriminators understood by the message service.
pub mod message_type {
	/// Start a production order.
	pub const PRODUCTION_ORDER_START: &str = "ProdProductionOrderStart";
	/// Report finished quantity against a production order.
	pub const PRODUCTION_ORDER_REPORT_FINISHED: &str = "ProdProductionOrderReportFinished";
	/// Post material consumption (picking list).
	pub const PRODUCTION_ORDER_PICKING_LIST: &str = "ProdProductionOrderPickingList";
	/// Post time consumption (route card).
	pub const PRODUCTION_ORDER_ROUTE_CARD: &str = "ProdProductionOrderRouteCard";
	/// End a production order.
	pub const PRODUCTION_ORDER_END: &str = "ProdProductionOrderEnd";
}

/// Envelope accepted by the message service endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageEnvelope {
	/// Legal entity the command executes in.
	#[serde(rename = "_companyId")]
	pub company_id: String,
	/// Target message queue.
	#[serde(rename = "_messageQueue")]
	pub message_queue: String,
	/// Payload discriminator, one of [`message_type`].
	#[serde(rename = "_messageType")]
	pub message_type: String,
	/// Payload serialized as a JSON string.
	#[serde(rename = "_messageContent")]
	pub message_content: String,
}
impl MessageEnvelope {
	/// Wraps `payload` for the given company and discriminator.
	pub fn wrap<T>(
		company_id: impl Into<String>,
		message_type: impl Into<String>,
		payload: &T,
	) -> Result<Self>
	where
		T: Serialize,
	{
		let message_content =
			serde_json::to_string(payload).map_err(|source| ApiError::Encode { source })?;

		Ok(Self {
			company_id: company_id.into(),
			message_queue: DEFAULT_MESSAGE_QUEUE.into(),
			message_type: message_type.into(),
			message_content,
		})
	}
}

/// Starts a production order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StartProductionOrder {
	/// Order to start.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Quantity to start; the whole remaining quantity when omitted.
	#[serde(rename = "StartedQuantity", skip_serializing_if = "Option::is_none")]
	pub started_quantity: Option<f64>,
	/// Start date override.
	#[serde(rename = "StartedDate", skip_serializing_if = "Option::is_none")]
	pub started_date: Option<String>,
	/// BOM consumption posting rule.
	#[serde(rename = "AutomaticBOMConsumptionRule", skip_serializing_if = "Option::is_none")]
	pub automatic_bom_consumption_rule: Option<String>,
	/// Route consumption posting rule.
	#[serde(rename = "AutomaticRouteConsumptionRule", skip_serializing_if = "Option::is_none")]
	pub automatic_route_consumption_rule: Option<String>,
}

/// Reports finished quantity against a production order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReportAsFinished {
	/// Order to report against.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Per-line report details.
	#[serde(rename = "ReportFinishedLines", default)]
	pub report_finished_lines: Vec<ReportFinishedLine>,
	/// Label print toggle.
	#[serde(rename = "PrintLabel", skip_serializing_if = "Option::is_none")]
	pub print_label: Option<String>,
}

/// One line of a report-as-finished message.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReportFinishedLine {
	/// BOM line number the report applies to.
	#[serde(rename = "LineNumber", skip_serializing_if = "Option::is_none")]
	pub line_number: Option<f64>,
	/// Reported item number.
	#[serde(rename = "ItemNumber", skip_serializing_if = "Option::is_none")]
	pub item_number: Option<String>,
	/// Good quantity produced.
	#[serde(rename = "ReportedGoodQuantity", skip_serializing_if = "Option::is_none")]
	pub reported_good_quantity: Option<f64>,
	/// Scrapped quantity.
	#[serde(rename = "ReportedErrorQuantity", skip_serializing_if = "Option::is_none")]
	pub reported_error_quantity: Option<f64>,
	/// Posting date.
	#[serde(rename = "ReportAsFinishedDate", skip_serializing_if = "Option::is_none")]
	pub report_as_finished_date: Option<String>,
	/// Marks the last report for the order.
	#[serde(rename = "EndJob", skip_serializing_if = "Option::is_none")]
	pub end_job: Option<String>,
	/// BOM consumption posting rule.
	#[serde(rename = "AutomaticBOMConsumptionRule", skip_serializing_if = "Option::is_none")]
	pub automatic_bom_consumption_rule: Option<String>,
	/// Route consumption posting rule.
	#[serde(rename = "AutomaticRouteConsumptionRule", skip_serializing_if = "Option::is_none")]
	pub automatic_route_consumption_rule: Option<String>,
	/// Batch number of the produced quantity.
	#[serde(rename = "ItemBatchNumber", skip_serializing_if = "Option::is_none")]
	pub item_batch_number: Option<String>,
	/// Serial number of the produced quantity.
	#[serde(rename = "ProductSerialNumber", skip_serializing_if = "Option::is_none")]
	pub product_serial_number: Option<String>,
}

/// Posts material consumption (picking list) for a production order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MaterialConsumption {
	/// Order the consumption posts against.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Consumed component lines.
	#[serde(rename = "PickingListLines", default)]
	pub picking_list_lines: Vec<PickingListLine>,
	/// Journal name override.
	#[serde(rename = "JournalNameId", skip_serializing_if = "Option::is_none")]
	pub journal_name_id: Option<String>,
}

/// One consumed component line.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PickingListLine {
	/// Consumed item number.
	#[serde(rename = "ItemNumber")]
	pub item_number: String,
	/// Consumption in BOM units.
	#[serde(rename = "ConsumptionBOMQuantity", skip_serializing_if = "Option::is_none")]
	pub consumption_bom_quantity: Option<f64>,
	/// Proposed consumption in BOM units.
	#[serde(rename = "ProposalBOMQuantity", skip_serializing_if = "Option::is_none")]
	pub proposal_bom_quantity: Option<f64>,
	/// Unit the BOM quantities are expressed in.
	#[serde(rename = "BOMUnitSymbol", skip_serializing_if = "Option::is_none")]
	pub bom_unit_symbol: Option<String>,
	/// Consumption posting date.
	#[serde(rename = "ConsumptionDate", skip_serializing_if = "Option::is_none")]
	pub consumption_date: Option<String>,
	/// Route operation the consumption belongs to.
	#[serde(rename = "OperationNumber", skip_serializing_if = "Option::is_none")]
	pub operation_number: Option<i32>,
	/// BOM line number.
	#[serde(rename = "LineNumber", skip_serializing_if = "Option::is_none")]
	pub line_number: Option<f64>,
	/// Marks consumption for the line as complete.
	#[serde(rename = "IsConsumptionEnded", skip_serializing_if = "Option::is_none")]
	pub is_consumption_ended: Option<String>,
	/// Warehouse the quantity is picked from.
	#[serde(rename = "ProductionWarehouseId", skip_serializing_if = "Option::is_none")]
	pub production_warehouse_id: Option<String>,
	/// Site the quantity is picked from.
	#[serde(rename = "ProductionSiteId", skip_serializing_if = "Option::is_none")]
	pub production_site_id: Option<String>,
}

/// Posts time consumption (route card) for a production order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RouteCard {
	/// Order the time posts against.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Operation time lines.
	#[serde(rename = "RouteCardLines", default)]
	pub route_card_lines: Vec<RouteCardLine>,
	/// Journal name override.
	#[serde(rename = "JournalNameId", skip_serializing_if = "Option::is_none")]
	pub journal_name_id: Option<String>,
}

/// One operation time line.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RouteCardLine {
	/// Route operation the time posts against.
	#[serde(rename = "OperationNumber")]
	pub operation_number: i32,
	/// Resource that performed the operation.
	#[serde(rename = "OperationsResourceId", skip_serializing_if = "Option::is_none")]
	pub operations_resource_id: Option<String>,
	/// Worker who performed the operation.
	#[serde(rename = "Worker", skip_serializing_if = "Option::is_none")]
	pub worker: Option<String>,
	/// Hours consumed.
	#[serde(rename = "Hours", skip_serializing_if = "Option::is_none")]
	pub hours: Option<f64>,
	/// Good quantity processed.
	#[serde(rename = "GoodQuantity", skip_serializing_if = "Option::is_none")]
	pub good_quantity: Option<f64>,
	/// Scrapped quantity processed.
	#[serde(rename = "ErrorQuantity", skip_serializing_if = "Option::is_none")]
	pub error_quantity: Option<f64>,
	/// Consumption posting date.
	#[serde(rename = "ConsumptionDate", skip_serializing_if = "Option::is_none")]
	pub consumption_date: Option<String>,
	/// Marks the operation as completed.
	#[serde(rename = "OperationCompleted", skip_serializing_if = "Option::is_none")]
	pub operation_completed: Option<String>,
}

/// Ends a production order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EndProductionOrder {
	/// Order to end.
	#[serde(rename = "ProductionOrderNumber")]
	pub production_order_number: String,
	/// Execution timestamp override.
	#[serde(rename = "ExecutedDateTime", skip_serializing_if = "Option::is_none")]
	pub executed_date_time: Option<String>,
	/// End date override.
	#[serde(rename = "EndedDate", skip_serializing_if = "Option::is_none")]
	pub ended_date: Option<String>,
	/// Costing toggle for time-and-attendance integration.
	#[serde(rename = "UseTimeAndAttendanceCost", skip_serializing_if = "Option::is_none")]
	pub use_time_and_attendance_cost: Option<String>,
	/// Report remaining quantity as finished while ending.
	#[serde(rename = "AutoReportAsFinished", skip_serializing_if = "Option::is_none")]
	pub auto_report_as_finished: Option<String>,
	/// Auto-update toggle.
	#[serde(rename = "AutoUpdate", skip_serializing_if = "Option::is_none")]
	pub auto_update: Option<String>,
}

/// Client for the environment's message service endpoint.
#[derive(Debug)]
pub struct MessageServiceClient {
	http: HttpClient,
	tokens: Arc<OperationsTokenProvider>,
}
impl MessageServiceClient {
	/// Creates a client reusing the provider's environment configuration.
	pub fn new(http: HttpClient, tokens: Arc<OperationsTokenProvider>) -> Self {
		Self { http, tokens }
	}

	/// Starts a production order.
	pub async fn start_production_order(&self, message: &StartProductionOrder) -> Result<()> {
		self.send_message(message_type::PRODUCTION_ORDER_START, message).await
	}

	/// Reports production as finished.
	pub async fn report_as_finished(&self, message: &ReportAsFinished) -> Result<()> {
		self.send_message(message_type::PRODUCTION_ORDER_REPORT_FINISHED, message).await
	}

	/// Posts material consumption (picking list).
	pub async fn report_material_consumption(&self, message: &MaterialConsumption) -> Result<()> {
		self.send_message(message_type::PRODUCTION_ORDER_PICKING_LIST, message).await
	}

	/// Posts time consumption (route card).
	pub async fn report_time_consumption(&self, message: &RouteCard) -> Result<()> {
		self.send_message(message_type::PRODUCTION_ORDER_ROUTE_CARD, message).await
	}

	/// Ends a production order.
	pub async fn end_production_order(&self, message: &EndProductionOrder) -> Result<()> {
		self.send_message(message_type::PRODUCTION_ORDER_END, message).await
	}

	/// Wraps `payload` in a [`MessageEnvelope`] and posts it to the message service.
	pub async fn send_message<T>(&self, message_type: &str, payload: &T) -> Result<()>
	where
		T: Serialize,
	{
		const KIND: FlowKind = FlowKind::Command;

		let span = FlowSpan::new(KIND, "send_message");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.tokens.config();
				let envelope =
					MessageEnvelope::wrap(config.company.as_ref(), message_type, payload)?;
				let endpoint = format!(
					"{}{MESSAGE_SERVICE_PATH}",
					config.base_url.as_str().trim_end_matches('/')
				);
				let token = self.tokens.get_token().await?;
				let response = self
					.http
					.post(endpoint)
					.bearer_auth(token)
					.json(&envelope)
					.send()
					.await
					.map_err(TransportError::from)?;

				read_success(response).await.map(|_| ())
			})
			.await;

		match &result {
			Ok(()) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
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
	fn envelope_wraps_payload_as_json_string() {
		let message = StartProductionOrder {
			production_order_number: "P000123".into(),
			started_quantity: Some(5.0),
			..Default::default()
		};
		let envelope =
			MessageEnvelope::wrap("usmf", message_type::PRODUCTION_ORDER_START, &message)
				.expect("Envelope should wrap a serializable payload.");

		assert_eq!(envelope.company_id, "usmf");
		assert_eq!(envelope.message_queue, DEFAULT_MESSAGE_QUEUE);
		assert_eq!(envelope.message_type, "ProdProductionOrderStart");

		// The inner payload must arrive as a string, not a nested object.
		let rendered =
			serde_json::to_value(&envelope).expect("Envelope should serialize to JSON.");

		assert!(rendered["_messageContent"].is_string());

		let content: serde_json::Value =
			serde_json::from_str(envelope.message_content.as_str())
				.expect("Inner content should itself be JSON.");

		assert_eq!(content["ProductionOrderNumber"], "P000123");
		assert_eq!(content["StartedQuantity"], 5.0);
		assert!(content.get("StartedDate").is_none(), "Unset options are omitted.");
	}

	#[test]
	fn report_as_finished_serializes_lines() {
		let message = ReportAsFinished {
			production_order_number: "P000123".into(),
			report_finished_lines: vec![ReportFinishedLine {
				reported_good_quantity: Some(3.0),
				end_job: Some("Yes".into()),
				..Default::default()
			}],
			..Default::default()
		};
		let rendered =
			serde_json::to_value(&message).expect("Message should serialize to JSON.");

		assert_eq!(rendered["ReportFinishedLines"][0]["ReportedGoodQuantity"], 3.0);
		assert_eq!(rendered["ReportFinishedLines"][0]["EndJob"], "Yes");
	}
}
