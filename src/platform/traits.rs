use async_trait::async_trait;

use crate::composer::Event;
use crate::error::{IdentityError, TransportError};

/// One unit of the collect endpoint's response to a submitted event.
///
/// Transient: copied into a log entry and then discarded.
#[derive(Debug, Clone)]
pub struct ResponseHandle {
    pub handle_type: String,
    pub payload: Option<serde_json::Value>,
}

/// Event submission seam — implement for the real collect endpoint or an
/// in-memory fake.
///
/// Contract: exactly one attempt per call, no internal retry, never blocks
/// the caller. An empty handle list is a valid success.
#[async_trait]
pub trait SubmitEvents: Send + Sync {
    async fn submit(&self, event: Event) -> Result<Vec<ResponseHandle>, TransportError>;
}

/// Identity resolution seam.
///
/// A successful empty string is a valid outcome distinct from
/// `IdentityError` and the two must never be conflated.
#[async_trait]
pub trait ResolveIdentity: Send + Sync {
    async fn resolve(&self) -> Result<String, IdentityError>;
}
