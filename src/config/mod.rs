pub mod schema;

pub use schema::{Config, EdgeConfig, PLACEHOLDER_ENVIRONMENT_ID};
