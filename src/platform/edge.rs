use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::http_client::build_edge_client;
use super::traits::{ResponseHandle, SubmitEvents};
use crate::composer::Event;
use crate::config::Config;
use crate::error::TransportError;

/// Client for the collect endpoint's interact call.
///
/// One POST per submit; retry and timeout policy beyond the HTTP client's
/// own belong to the transport, not here.
pub struct EdgeGateway {
    cached_interact_url: String,
    environment_id: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct InteractRequest {
    events: Vec<WireEvent>,
}

/// The dual-channel payload split: `xdm` is schema-validated, `data` is
/// free-form. This split is the one structural wire contract and must be
/// preserved exactly.
#[derive(Debug, Serialize)]
struct WireEvent {
    xdm: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl WireEvent {
    fn from_event(event: Event) -> Self {
        let mut xdm = event.schema;
        xdm.insert("eventType".to_string(), Value::String(event.event_type));
        xdm.insert("timestamp".to_string(), Value::String(event.timestamp));

        let data = if event.custom.is_empty() {
            None
        } else {
            Some(Value::Object(event.custom))
        };

        Self {
            xdm: Value::Object(xdm),
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InteractResponse {
    #[serde(default)]
    handles: Vec<WireHandle>,
}

#[derive(Debug, Deserialize)]
struct WireHandle {
    #[serde(rename = "type")]
    handle_type: String,
    #[serde(default)]
    payload: Option<Value>,
}

impl EdgeGateway {
    pub fn new(config: &Config) -> Self {
        let base = config.edge.base_url.trim_end_matches('/');
        Self {
            cached_interact_url: format!("{base}/ee/v1/interact"),
            environment_id: config.environment_id.clone(),
            client: build_edge_client(config.edge.request_timeout_secs),
        }
    }
}

#[async_trait]
impl SubmitEvents for EdgeGateway {
    async fn submit(&self, event: Event) -> Result<Vec<ResponseHandle>, TransportError> {
        let request_id = Uuid::new_v4().to_string();
        debug!(
            request_id = %request_id,
            event_type = %event.event_type,
            "submitting experience event"
        );

        let body = InteractRequest {
            events: vec![WireEvent::from_event(event)],
        };

        let response = self
            .client
            .post(&self.cached_interact_url)
            .query(&[
                ("configId", self.environment_id.as_str()),
                ("requestId", request_id.as_str()),
            ])
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::new(format!("edge request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::new(format!(
                "edge collect rejected the event ({status}): {}",
                detail.trim()
            )));
        }

        let parsed: InteractResponse = response
            .json()
            .await
            .map_err(|e| TransportError::new(format!("malformed edge response: {e}")))?;

        Ok(parsed
            .handles
            .into_iter()
            .map(|handle| ResponseHandle {
                handle_type: handle.handle_type,
                payload: handle.payload,
            })
            .collect())
    }
}
