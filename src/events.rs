//! Business-event envelope parsing.
//!
//! Queue consumption and acknowledgement stay with the messaging SDK; this module only
//! turns a delivered message body into typed data. The envelope carries the actual event
//! as a JSON *string* discriminated by `EventId`, which [`BusinessEventEnvelope::event`]
//! dispatches into a [`BusinessEvent`] variant, with an explicit fallback for event ids
//! this crate does not model.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::_prelude::*;

/// Event-id discriminators this crate models.
pub mod event_id {
	/// A production order was released.
	pub const PRODUCTION_ORDER_RELEASED: &str = "ProductionOrderReleasedBusinessEvent";
	/// A production order changed lifecycle status.
	pub const PRODUCTION_ORDER_STATUS_CHANGED: &str = "ProductionOrderStatusChangedBusinessEvent";
}

/// Errors raised while decoding envelopes and payloads.
#[derive(Debug, ThisError)]
pub enum EventError {
	/// Envelope body was not the expected JSON document.
	#[error("Business event envelope is malformed.")]
	Envelope {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Inner payload did not decode for the given event id.
	#[error("Business event payload for `{event_id}` is malformed.")]
	Payload {
		/// Discriminator the payload was dispatched on.
		event_id: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Envelope carries no inner payload.
	#[error("Business event envelope carries no payload.")]
	MissingPayload,
}

/// Envelope wrapped around every published business event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusinessEventEnvelope {
	/// Stable identifier of this occurrence.
	#[serde(rename = "BusinessEventId", default)]
	pub business_event_id: Option<String>,
	/// Monotonic sequence number within the publishing environment.
	#[serde(rename = "ControlNumber", default)]
	pub control_number: i64,
	/// Discriminator naming the event type.
	#[serde(rename = "EventId", default)]
	pub event_id: Option<String>,
	/// Instant the event was raised.
	#[serde(rename = "EventTime", with = "event_time")]
	pub event_time: OffsetDateTime,
	/// Event schema major version.
	#[serde(rename = "MajorVersion", default)]
	pub major_version: i32,
	/// Event schema minor version.
	#[serde(rename = "MinorVersion", default)]
	pub minor_version: i32,
	/// Legal entity the event originates from.
	#[serde(rename = "LegalEntity", default)]
	pub legal_entity: Option<String>,
	/// Event payload serialized as a JSON string.
	#[serde(rename = "BusinessEvent", default)]
	pub business_event: Option<String>,
}
impl BusinessEventEnvelope {
	/// Decodes an envelope from a delivered message body.
	pub fn parse(body: &str) -> Result<Self, EventError> {
		let mut deserializer = serde_json::Deserializer::from_str(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| EventError::Envelope { source })
	}

	/// Dispatches the inner payload on [`EventId`](Self::event_id).
	///
	/// Event ids without a modeled variant land in [`BusinessEvent::Unrecognized`] with
	/// the raw payload preserved, so consumers can still route or log them.
	pub fn event(&self) -> Result<BusinessEvent, EventError> {
		let payload = self.business_event.as_deref().ok_or(EventError::MissingPayload)?;
		let event_id = self.event_id.as_deref().unwrap_or_default();

		Ok(match event_id {
			event_id::PRODUCTION_ORDER_RELEASED =>
				BusinessEvent::ProductionOrderReleased(decode_payload(event_id, payload)?),
			event_id::PRODUCTION_ORDER_STATUS_CHANGED =>
				BusinessEvent::ProductionOrderStatusChanged(decode_payload(event_id, payload)?),
			_ => BusinessEvent::Unrecognized {
				event_id: event_id.to_owned(),
				payload: decode_payload(event_id, payload)?,
			},
		})
	}
}

fn decode_payload<T>(event_id: &str, payload: &str) -> Result<T, EventError>
where
	T: serde::de::DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(payload);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| EventError::Payload { event_id: event_id.to_owned(), source })
}

/// Typed view over the envelope's inner payload.
#[derive(Clone, Debug)]
pub enum BusinessEvent {
	/// A production order was released.
	ProductionOrderReleased(ProductionOrderReleased),
	/// A production order changed lifecycle status.
	ProductionOrderStatusChanged(ProductionOrderStatusChanged),
	/// An event id this crate does not model; the raw payload is preserved.
	Unrecognized {
		/// Discriminator found in the envelope.
		event_id: String,
		/// Raw payload document.
		payload: serde_json::Value,
	},
}

/// Payload of [`event_id::PRODUCTION_ORDER_RELEASED`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductionOrderReleased {
	/// Released order number.
	#[serde(rename = "ProductionOrderNumber", default)]
	pub production_order_number: Option<String>,
	/// Finished-good item number.
	#[serde(rename = "ItemNumber", default)]
	pub item_number: Option<String>,
	/// Production site.
	#[serde(rename = "ProductionSiteId", default)]
	pub production_site_id: Option<String>,
	/// Production warehouse.
	#[serde(rename = "ProductionWarehouseId", default)]
	pub production_warehouse_id: Option<String>,
	/// Scheduled start date.
	#[serde(rename = "ScheduledStartDate", default)]
	pub scheduled_start_date: Option<String>,
	/// Scheduled end date.
	#[serde(rename = "ScheduledEndDate", default)]
	pub scheduled_end_date: Option<String>,
	/// Status at release time.
	#[serde(rename = "ProductionOrderStatus", default)]
	pub production_order_status: Option<String>,
	/// Quantity still to schedule.
	#[serde(rename = "RemainingSchedulingQuantity", default)]
	pub remaining_scheduling_quantity: f64,
	/// Default ledger dimension display value.
	#[serde(rename = "DefaultLedgerDimensionDisplayValue", default)]
	pub default_ledger_dimension_display_value: Option<String>,
}

/// Payload of [`event_id::PRODUCTION_ORDER_STATUS_CHANGED`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductionOrderStatusChanged {
	/// Order whose status changed.
	#[serde(rename = "ProductionOrderNumber", default)]
	pub production_order_number: Option<String>,
	/// Finished-good item number.
	#[serde(rename = "ItemNumber", default)]
	pub item_number: Option<String>,
	/// New lifecycle status.
	#[serde(rename = "ProductionOrderStatus", default)]
	pub production_order_status: Option<String>,
	/// Production site.
	#[serde(rename = "ProductionSiteId", default)]
	pub production_site_id: Option<String>,
	/// Production warehouse.
	#[serde(rename = "ProductionWarehouseId", default)]
	pub production_warehouse_id: Option<String>,
}

mod event_time {
	//! `EventTime` arrives either as RFC 3339 or as the legacy `/Date(<unix-millis>)/`
	//! encoding, depending on the publishing pipeline. Serialization always emits
	//! RFC 3339.

	// crates.io
	use serde::{Deserializer, Serializer, de, ser};
	// self
	use super::*;

	pub(super) fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let rendered = value.format(&Rfc3339).map_err(ser::Error::custom)?;

		serializer.serialize_str(&rendered)
	}

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		parse(&raw)
			.ok_or_else(|| de::Error::custom(format!("unrecognized event time `{raw}`")))
	}

	pub(super) fn parse(raw: &str) -> Option<OffsetDateTime> {
		if let Some(millis) =
			raw.strip_prefix("/Date(").and_then(|rest| rest.strip_suffix(")/"))
		{
			let millis = millis.parse::<i128>().ok()?;

			return OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000).ok();
		}

		OffsetDateTime::parse(raw, &Rfc3339).ok()
	}
}
