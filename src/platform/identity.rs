use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http_client::build_edge_client;
use super::traits::ResolveIdentity;
use crate::config::Config;
use crate::error::IdentityError;

/// Client for the identity endpoint. Resolves the ECID issued to this
/// client instance; an empty value is legitimate before first resolution.
pub struct IdentityClient {
    cached_identity_url: String,
    environment_id: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    #[serde(default)]
    ecid: String,
}

impl IdentityClient {
    pub fn new(config: &Config) -> Self {
        let base = config.edge.base_url.trim_end_matches('/');
        Self {
            cached_identity_url: format!("{base}/ee/v1/identity"),
            environment_id: config.environment_id.clone(),
            client: build_edge_client(config.edge.request_timeout_secs),
        }
    }
}

#[async_trait]
impl ResolveIdentity for IdentityClient {
    async fn resolve(&self) -> Result<String, IdentityError> {
        debug!("requesting ecid from the identity endpoint");

        let response = self
            .client
            .get(&self.cached_identity_url)
            .query(&[("configId", self.environment_id.as_str())])
            .send()
            .await
            .map_err(|_| IdentityError::new(0, "Unreachable"))?;

        let status = response.status();
        if !status.is_success() {
            let name = status
                .canonical_reason()
                .map_or_else(|| "HttpError".to_string(), |reason| reason.replace(' ', ""));
            return Err(IdentityError::new(status.as_u16(), name));
        }

        let parsed: IdentityResponse = response
            .json()
            .await
            .map_err(|_| IdentityError::new(0, "MalformedResponse"))?;

        Ok(parsed.ecid)
    }
}
