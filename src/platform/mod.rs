pub mod edge;
pub mod http_client;
pub mod identity;
pub mod readiness;
pub mod traits;

pub use edge::EdgeGateway;
pub use identity::IdentityClient;
pub use readiness::{PLACEHOLDER_ENVIRONMENT_ID, ReadinessResult, bootstrap};
pub use traits::{ResolveIdentity, ResponseHandle, SubmitEvents};
