use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::error::CompositionError;

/// One channel of an event payload: a tree of nested mappings, sequences,
/// and scalars.
pub type Channel = Map<String, Value>;

/// Timestamp layout required by the collect endpoint: ISO-8601 UTC with
/// millisecond precision and a literal trailing `Z`.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A composed experience event, ready for exactly one submission.
///
/// The schema channel is validated server-side against the shared data
/// model; the custom channel is free-form. The two are disjoint namespaces
/// and travel separately on the wire.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub timestamp: String,
    pub schema: Channel,
    pub custom: Channel,
}

impl Event {
    fn new(
        event_type: &str,
        now: DateTime<Utc>,
        schema: Channel,
        custom: Channel,
    ) -> Result<Self, CompositionError> {
        if event_type.is_empty() {
            return Err(CompositionError::EmptyEventType);
        }
        Ok(Self {
            event_type: event_type.to_string(),
            timestamp: format_timestamp(now),
            schema,
            custom,
        })
    }

    /// True when no key appears in both channels.
    pub fn channels_disjoint(&self) -> bool {
        self.schema.keys().all(|key| !self.custom.contains_key(key))
    }
}

pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format(EVENT_TIMESTAMP_FORMAT).to_string()
}

/// Minimal validation event: type and timestamp only, no custom channel.
pub fn basic_validation(now: DateTime<Utc>) -> Result<Event, CompositionError> {
    Event::new("mobile.validation", now, Channel::new(), Channel::new())
}

/// Commerce product-view event with one product-list item in the schema
/// channel and app/user/action metadata in the custom channel.
pub fn commerce_product_view(
    now: DateTime<Utc>,
    sku: &str,
    name: &str,
    quantity: i64,
    price_total: f64,
) -> Result<Event, CompositionError> {
    if sku.trim().is_empty() {
        return Err(CompositionError::EmptySku);
    }
    if name.trim().is_empty() {
        return Err(CompositionError::EmptyProductName);
    }
    if quantity < 0 {
        return Err(CompositionError::NegativeQuantity(quantity));
    }
    if !price_total.is_finite() {
        return Err(CompositionError::NonFinitePrice(price_total));
    }

    let schema = tree(json!({
        "commerce": {
            "productListViews": { "value": 1 }
        },
        "productListItems": [
            {
                "SKU": sku,
                "name": name,
                "quantity": quantity,
                "priceTotal": price_total
            }
        ]
    }));

    let custom = tree(json!({
        "app": {
            "name": "AEPValidationApp",
            "version": "1.0"
        },
        "user": {
            "testUserId": "U12345",
            "segment": "dummy_segment"
        },
        "action": {
            "screen": "Main",
            "button": "Send Edge Event with Data"
        }
    }));

    Event::new("commerce.productViews", now, schema, custom)
}

fn tree(value: Value) -> Channel {
    match value {
        Value::Object(map) => map,
        _ => Channel::new(),
    }
}
