use url::Url;

use crate::config::Config;

pub use crate::config::PLACEHOLDER_ENVIRONMENT_ID;

/// Outcome of the one-time startup handshake.
///
/// Produced once by [`bootstrap`] and handed to the orchestrator at
/// construction; nothing mutates it afterwards, so an initialization error
/// stays sticky for the process lifetime.
#[derive(Debug, Clone)]
pub struct ReadinessResult {
    pub ready: bool,
    pub environment_id: String,
    pub error: Option<String>,
}

impl ReadinessResult {
    pub fn has_placeholder_environment_id(&self) -> bool {
        self.environment_id == PLACEHOLDER_ENVIRONMENT_ID
    }
}

/// Run the startup handshake against the loaded config.
///
/// Never fails the process: a bad config surfaces as a not-ready result
/// with an error message, rendered on every status check.
pub fn bootstrap(config: &Config) -> ReadinessResult {
    let environment_id = config.environment_id.clone();

    if environment_id.trim().is_empty() {
        return ReadinessResult {
            ready: false,
            environment_id,
            error: Some("environment_id is empty".to_string()),
        };
    }

    if let Err(e) = Url::parse(&config.edge.base_url) {
        return ReadinessResult {
            ready: false,
            environment_id,
            error: Some(format!(
                "edge.base_url is not a valid url ({}): {e}",
                config.edge.base_url
            )),
        };
    }

    ReadinessResult {
        ready: true,
        environment_id,
        error: None,
    }
}
