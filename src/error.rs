use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `EdgeProbe`.
///
/// Each subsystem defines its own error type. Library callers can match on
/// these to decide recovery strategy; the app layer continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ProbeError {
    // ── Event composition ────────────────────────────────────────────────
    #[error("composition: {0}")]
    Composition(#[from] CompositionError),

    // ── Edge collect transport ──────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Identity resolution ─────────────────────────────────────────────
    #[error("identity: {0}")]
    Identity(#[from] IdentityError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Composition errors ─────────────────────────────────────────────────────

/// Precondition violations caught before any network call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositionError {
    #[error("event type must not be empty")]
    EmptyEventType,

    #[error("product SKU must not be empty")]
    EmptySku,

    #[error("product name must not be empty")]
    EmptyProductName,

    #[error("quantity must be non-negative, got {0}")]
    NegativeQuantity(i64),

    #[error("price total must be finite, got {0}")]
    NonFinitePrice(f64),
}

// ─── Transport errors ───────────────────────────────────────────────────────

/// A failed event submission. The collect endpoint gives no reliable way to
/// tell a network fault from a rejection, so only a message is carried.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ─── Identity errors ────────────────────────────────────────────────────────

/// A failed identity resolution. `code` is the HTTP status when one was
/// received, 0 for connection-level faults; `name` is the short error name
/// shown in the identifier display.
#[derive(Debug, Clone, Error)]
#[error("{name} (code {code})")]
pub struct IdentityError {
    pub code: u16,
    pub name: String,
}

impl IdentityError {
    pub fn new(code: u16, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

// ─── Config errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_error_displays_quantity() {
        let err = ProbeError::Composition(CompositionError::NegativeQuantity(-3));
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn transport_error_is_message_only() {
        let err = TransportError::new("network unreachable");
        assert_eq!(err.to_string(), "network unreachable");
    }

    #[test]
    fn identity_error_displays_both_fields() {
        let err = IdentityError::new(503, "ServiceUnavailable");
        assert!(err.to_string().contains("ServiceUnavailable"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn config_error_displays_correctly() {
        let err = ProbeError::Config(ConfigError::Validation("bad base_url".into()));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let probe_err: ProbeError = anyhow_err.into();
        assert!(probe_err.to_string().contains("something went wrong"));
    }
}
