use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::composer;
use crate::composer::Event;
use crate::error::{CompositionError, IdentityError, TransportError};
use crate::platform::readiness::ReadinessResult;
use crate::platform::traits::{ResolveIdentity, ResponseHandle, SubmitEvents};
use crate::status::{LogEntry, Status, StatusLog};

/// Identifier line before the first successful resolution and after a clear.
pub const IDENTITY_NOT_RETRIEVED: &str = "ECID: (not retrieved yet)";
/// Identifier line for a resolution that succeeded with an empty value.
pub const IDENTITY_EMPTY: &str = "ECID: (empty)";

/// The four user-triggered actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SendBasic,
    SendWithData,
    FetchIdentity,
    Clear,
}

/// A remote call's result, marshaled back to the owning loop over the
/// completion channel.
#[derive(Debug)]
pub enum Completion {
    Submit {
        label: &'static str,
        outcome: Result<Vec<ResponseHandle>, TransportError>,
    },
    Identity {
        outcome: Result<String, IdentityError>,
    },
}

/// Ties composition, the remote clients, and the status log together.
///
/// `dispatch` runs on the owning loop and never blocks: remote calls are
/// spawned and their results come back as [`Completion`] messages on the
/// channel handed in at construction. Only `apply` — called by the single
/// loop draining that channel — touches the identifier display, so display
/// state has exactly one writer even though the status log itself is safe
/// under concurrent appends.
pub struct Orchestrator {
    log: Arc<StatusLog>,
    gateway: Arc<dyn SubmitEvents>,
    identity: Arc<dyn ResolveIdentity>,
    readiness: Arc<ReadinessResult>,
    identity_line: String,
    completions: mpsc::UnboundedSender<Completion>,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn SubmitEvents>,
        identity: Arc<dyn ResolveIdentity>,
        readiness: Arc<ReadinessResult>,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            log: Arc::new(StatusLog::new()),
            gateway,
            identity,
            readiness,
            identity_line: IDENTITY_NOT_RETRIEVED.to_string(),
            completions,
        }
    }

    pub fn identity_line(&self) -> &str {
        &self.identity_line
    }

    pub fn snapshot(&self) -> (Vec<LogEntry>, Status) {
        self.log.snapshot()
    }

    /// Append the startup readiness lines. Called once at launch and again
    /// on every clear; reads the readiness result, never changes it.
    pub fn log_readiness(&self) {
        if let Some(error) = &self.readiness.error {
            self.log
                .append(format!("ERROR: platform initialization failed: {error}"));
        } else if self.readiness.ready {
            self.log.append(format!(
                "sdk initialized with environment id {}",
                self.readiness.environment_id
            ));
        } else {
            self.log.append("sdk is initializing...");
        }

        if self.readiness.has_placeholder_environment_id() {
            self.log.append(
                "WARNING: environment_id is still the placeholder; set it in config.toml",
            );
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatching user action");
        match action {
            Action::SendBasic => {
                self.submit_composed("basic edge event", composer::basic_validation(Utc::now()));
            }
            Action::SendWithData => {
                self.submit_composed(
                    "edge event with product data",
                    composer::commerce_product_view(
                        Utc::now(),
                        "PROD-12345",
                        "Test Product",
                        1,
                        99.99,
                    ),
                );
            }
            Action::FetchIdentity => self.fetch_identity(),
            Action::Clear => self.clear(),
        }
    }

    /// Fold one completion into the observable state. Must only be called
    /// from the loop draining the completion channel.
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Submit { label, outcome } => match outcome {
                Ok(handles) => {
                    self.log.append(format!(
                        "SUCCESS: {label} sent ({} handles)",
                        handles.len()
                    ));
                    for handle in &handles {
                        match &handle.payload {
                            Some(payload) => self.log.append(format!(
                                "Handle type: {}, payload: {payload}",
                                handle.handle_type
                            )),
                            None => self
                                .log
                                .append(format!("Handle type: {}", handle.handle_type)),
                        }
                    }
                    self.log.set_status(Status::Success(format!("{label} sent")));
                }
                Err(err) => {
                    warn!(%err, "event submission failed");
                    self.log.append(format!("ERROR: {}", err.message));
                    self.log.set_status(Status::Error(err.message));
                }
            },
            Completion::Identity { outcome } => match outcome {
                Ok(ecid) if !ecid.is_empty() => {
                    self.identity_line = format!("ECID: {ecid}");
                    self.log.append(format!("ECID: {ecid}"));
                    self.log
                        .set_status(Status::Success("ecid retrieved".to_string()));
                }
                Ok(_) => {
                    self.identity_line = IDENTITY_EMPTY.to_string();
                    self.log.append("WARNING: ECID returned empty");
                    self.log
                        .set_status(Status::Warning("ecid is empty".to_string()));
                }
                Err(err) => {
                    warn!(%err, "ecid resolution failed");
                    self.identity_line = format!("ECID: error - {}", err.name);
                    self.log.append(format!("ERROR getting ECID: {err}"));
                    self.log
                        .set_status(Status::Error(format!("failed to get ecid: {}", err.name)));
                }
            },
        }
    }

    fn submit_composed(
        &self,
        label: &'static str,
        composed: Result<Event, CompositionError>,
    ) {
        let event = match composed {
            Ok(event) => event,
            Err(err) => {
                self.log.append(format!("ERROR: {err}"));
                self.log.set_status(Status::Error(err.to_string()));
                return;
            }
        };

        if !self.readiness.ready || self.readiness.error.is_some() {
            self.log
                .append("WARNING: submitting before the platform reported ready");
        }

        self.log.set_status(Status::Pending);
        self.log.append(format!("Sending {label}..."));

        let gateway = Arc::clone(&self.gateway);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = gateway.submit(event).await;
            let _ = completions.send(Completion::Submit { label, outcome });
        });
    }

    fn fetch_identity(&self) {
        self.log.set_status(Status::Pending);
        self.log
            .append("Requesting ECID from the identity endpoint...");

        let identity = Arc::clone(&self.identity);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = identity.resolve().await;
            let _ = completions.send(Completion::Identity { outcome });
        });
    }

    fn clear(&mut self) {
        self.log.reset();
        self.identity_line = IDENTITY_NOT_RETRIEVED.to_string();
        self.log_readiness();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGateway {
        outcome: Result<Vec<ResponseHandle>, TransportError>,
        calls: AtomicUsize,
    }

    impl FakeGateway {
        fn ok(handles: Vec<ResponseHandle>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(handles),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(TransportError::new(message)),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SubmitEvents for FakeGateway {
        async fn submit(&self, _event: Event) -> Result<Vec<ResponseHandle>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    struct FakeIdentity {
        outcome: Result<String, IdentityError>,
    }

    #[async_trait]
    impl ResolveIdentity for FakeIdentity {
        async fn resolve(&self) -> Result<String, IdentityError> {
            self.outcome.clone()
        }
    }

    fn ready() -> Arc<ReadinessResult> {
        Arc::new(ReadinessResult {
            ready: true,
            environment_id: "launch-env-1234".to_string(),
            error: None,
        })
    }

    fn handle(handle_type: &str) -> ResponseHandle {
        ResponseHandle {
            handle_type: handle_type.to_string(),
            payload: None,
        }
    }

    fn build(
        gateway: Arc<dyn SubmitEvents>,
        identity_outcome: Result<String, IdentityError>,
    ) -> (Orchestrator, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let identity = Arc::new(FakeIdentity {
            outcome: identity_outcome,
        });
        (Orchestrator::new(gateway, identity, ready(), tx), rx)
    }

    fn messages(orchestrator: &Orchestrator) -> Vec<String> {
        let (entries, _) = orchestrator.snapshot();
        entries.into_iter().map(|e| e.message).collect()
    }

    #[tokio::test]
    async fn submit_success_logs_handles_and_sets_success() {
        let gateway = FakeGateway::ok(vec![handle("state:store")]);
        let (mut orchestrator, mut rx) = build(gateway, Ok(String::new()));

        orchestrator.dispatch(Action::SendBasic);
        let (_, status) = orchestrator.snapshot();
        assert_eq!(status, Status::Pending);

        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);

        let messages = messages(&orchestrator);
        assert!(messages.iter().any(|m| m.starts_with("Sending basic")));
        assert!(messages.iter().any(|m| m.starts_with("SUCCESS:")));
        assert!(messages.iter().any(|m| m.contains("state:store")));
        let (_, status) = orchestrator.snapshot();
        assert!(matches!(status, Status::Success(_)));
    }

    #[tokio::test]
    async fn empty_handle_list_is_still_success() {
        let gateway = FakeGateway::ok(vec![]);
        let (mut orchestrator, mut rx) = build(gateway, Ok(String::new()));

        orchestrator.dispatch(Action::SendWithData);
        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);

        let (_, status) = orchestrator.snapshot();
        assert!(matches!(status, Status::Success(_)));
    }

    #[tokio::test]
    async fn transport_failure_logs_exact_message() {
        let gateway = FakeGateway::failing("network unreachable");
        let (mut orchestrator, mut rx) = build(gateway, Ok(String::new()));

        orchestrator.dispatch(Action::SendBasic);
        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);

        let messages = messages(&orchestrator);
        assert!(messages.iter().any(|m| m.contains("network unreachable")));
        let (_, status) = orchestrator.snapshot();
        assert_eq!(status, Status::Error("network unreachable".to_string()));
    }

    #[tokio::test]
    async fn composition_failure_never_reaches_the_gateway() {
        let gateway = FakeGateway::ok(vec![]);
        let (mut orchestrator, mut rx) = build(Arc::clone(&gateway), Ok(String::new()));

        orchestrator.submit_composed(
            "broken event",
            Err(CompositionError::NegativeQuantity(-1)),
        );

        // No completion is ever produced and the gateway is never called.
        assert!(rx.try_recv().is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        let (_, status) = orchestrator.snapshot();
        assert!(matches!(status, Status::Error(_)));
        assert!(
            messages(&orchestrator)
                .iter()
                .any(|m| m.contains("non-negative"))
        );
    }

    #[tokio::test]
    async fn identity_success_updates_display_and_log() {
        let gateway = FakeGateway::ok(vec![]);
        let ecid = "79721746535534430731800344094206447972";
        let (mut orchestrator, mut rx) = build(gateway, Ok(ecid.to_string()));

        orchestrator.dispatch(Action::FetchIdentity);
        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);

        assert_eq!(orchestrator.identity_line(), format!("ECID: {ecid}"));
        let (_, status) = orchestrator.snapshot();
        assert!(matches!(status, Status::Success(_)));
    }

    #[tokio::test]
    async fn empty_identity_is_a_warning_not_an_error() {
        let gateway = FakeGateway::ok(vec![]);
        let (mut orchestrator, mut rx) = build(gateway, Ok(String::new()));

        orchestrator.dispatch(Action::FetchIdentity);
        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);

        assert_eq!(orchestrator.identity_line(), IDENTITY_EMPTY);
        assert!(
            messages(&orchestrator)
                .iter()
                .any(|m| m.starts_with("WARNING:"))
        );
        let (_, status) = orchestrator.snapshot();
        assert!(matches!(status, Status::Warning(_)));
    }

    #[tokio::test]
    async fn failed_identity_is_distinct_from_empty_identity() {
        let gateway = FakeGateway::ok(vec![]);
        let (mut orchestrator, mut rx) = build(
            gateway,
            Err(IdentityError::new(503, "ServiceUnavailable")),
        );

        orchestrator.dispatch(Action::FetchIdentity);
        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);

        assert_eq!(
            orchestrator.identity_line(),
            "ECID: error - ServiceUnavailable"
        );
        assert_ne!(orchestrator.identity_line(), IDENTITY_EMPTY);
        let (_, status) = orchestrator.snapshot();
        assert!(matches!(status, Status::Error(_)));
    }

    #[tokio::test]
    async fn racing_submits_keep_one_success_entry_each_and_last_status_wins() {
        let gateway = FakeGateway::ok(vec![]);
        let (mut orchestrator, _rx) = build(gateway, Ok(String::new()));

        // Model two concurrent submits whose completions arrive out of
        // initiation order: the one-handle call resolves after the empty one.
        orchestrator.apply(Completion::Submit {
            label: "edge event with product data",
            outcome: Ok(vec![]),
        });
        orchestrator.apply(Completion::Submit {
            label: "basic edge event",
            outcome: Ok(vec![handle("state:store")]),
        });

        let success_entries = messages(&orchestrator)
            .iter()
            .filter(|m| m.starts_with("SUCCESS:"))
            .count();
        assert_eq!(success_entries, 2);

        let (_, status) = orchestrator.snapshot();
        assert_eq!(status, Status::Success("basic edge event sent".to_string()));
    }

    #[tokio::test]
    async fn clear_resets_log_and_identity_then_relogs_readiness() {
        let gateway = FakeGateway::ok(vec![]);
        let ecid = "79721746535534430731800344094206447972";
        let (mut orchestrator, mut rx) = build(gateway, Ok(ecid.to_string()));

        orchestrator.dispatch(Action::FetchIdentity);
        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);
        assert_ne!(orchestrator.identity_line(), IDENTITY_NOT_RETRIEVED);

        orchestrator.dispatch(Action::Clear);

        assert_eq!(orchestrator.identity_line(), IDENTITY_NOT_RETRIEVED);
        let messages = messages(&orchestrator);
        assert!(messages.iter().all(|m| !m.contains(ecid)));
        assert!(
            messages
                .iter()
                .any(|m| m.contains("sdk initialized with environment id"))
        );
        let (_, status) = orchestrator.snapshot();
        assert_eq!(status, Status::Idle);
    }

    #[tokio::test]
    async fn submitting_while_not_ready_warns_but_proceeds() {
        let gateway = FakeGateway::ok(vec![]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let identity = Arc::new(FakeIdentity {
            outcome: Ok(String::new()),
        });
        let not_ready = Arc::new(ReadinessResult {
            ready: false,
            environment_id: "launch-env-1234".to_string(),
            error: None,
        });
        let mut orchestrator = Orchestrator::new(gateway, identity, not_ready, tx);

        orchestrator.dispatch(Action::SendBasic);
        let completion = rx.recv().await.unwrap();
        orchestrator.apply(completion);

        let messages = messages(&orchestrator);
        assert!(
            messages
                .iter()
                .any(|m| m.contains("before the platform reported ready"))
        );
        let (_, status) = orchestrator.snapshot();
        assert!(matches!(status, Status::Success(_)));
    }
}
