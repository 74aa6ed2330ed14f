//! Webhook dispatcher - routes verified events to their handlers.
//!
//! The routing table is fixed at construction. Unknown event types are
//! acknowledged without processing so new provider event types never cause
//! delivery failures. Handler errors and panics are captured in the outcome
//! instead of propagating.
//!
//! No event-id deduplication happens here: a redelivered event runs its
//! handler again.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;

use super::webhook_errors::WebhookError;
use super::webhook_event::WebhookEvent;

/// Downstream action a handler reports for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookAction {
    ActivateService,
    SuspendService,
    ProvisionResources,
    UpdateResources,
    DeprovisionResources,
    ExtendSubscription,
    NotifyPaymentFailure,
}

impl WebhookAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookAction::ActivateService => "activate_service",
            WebhookAction::SuspendService => "suspend_service",
            WebhookAction::ProvisionResources => "provision_resources",
            WebhookAction::UpdateResources => "update_resources",
            WebhookAction::DeprovisionResources => "deprovision_resources",
            WebhookAction::ExtendSubscription => "extend_subscription",
            WebhookAction::NotifyPaymentFailure => "notify_payment_failure",
        }
    }
}

impl fmt::Display for WebhookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler for a single Stripe event type.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Event type string this handler is registered under.
    fn event_type(&self) -> &str;

    /// Handles the event and reports the intended downstream action.
    async fn handle(&self, event: &WebhookEvent) -> Result<WebhookAction, WebhookError>;
}

/// Severity used when an [`ActionHandler`] logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
}

/// Placeholder handler that logs the affected object and reports an action.
///
/// Performs no side effects. Fails with `MissingField("id")` when the event
/// object carries no id.
#[derive(Debug, Clone)]
pub struct ActionHandler {
    event_type: &'static str,
    action: WebhookAction,
    severity: Severity,
}

impl ActionHandler {
    pub const fn new(event_type: &'static str, action: WebhookAction, severity: Severity) -> Self {
        Self {
            event_type,
            action,
            severity,
        }
    }
}

#[async_trait]
impl WebhookEventHandler for ActionHandler {
    fn event_type(&self) -> &str {
        self.event_type
    }

    async fn handle(&self, event: &WebhookEvent) -> Result<WebhookAction, WebhookError> {
        let object_id = event.object_id().ok_or(WebhookError::MissingField("id"))?;

        match self.severity {
            Severity::Info => tracing::info!(
                event_id = %event.id,
                event_type = self.event_type,
                object_id,
                action = %self.action,
                "Webhook event handled"
            ),
            Severity::Warn => tracing::warn!(
                event_id = %event.id,
                event_type = self.event_type,
                object_id,
                action = %self.action,
                "Webhook event handled"
            ),
        }

        Ok(self.action)
    }
}

/// Standard event type to action table.
const STANDARD_HANDLERS: [ActionHandler; 7] = [
    ActionHandler::new(
        "payment_intent.succeeded",
        WebhookAction::ActivateService,
        Severity::Info,
    ),
    ActionHandler::new(
        "payment_intent.payment_failed",
        WebhookAction::SuspendService,
        Severity::Warn,
    ),
    ActionHandler::new(
        "customer.subscription.created",
        WebhookAction::ProvisionResources,
        Severity::Info,
    ),
    ActionHandler::new(
        "customer.subscription.updated",
        WebhookAction::UpdateResources,
        Severity::Info,
    ),
    ActionHandler::new(
        "customer.subscription.deleted",
        WebhookAction::DeprovisionResources,
        Severity::Info,
    ),
    ActionHandler::new(
        "invoice.payment_succeeded",
        WebhookAction::ExtendSubscription,
        Severity::Info,
    ),
    ActionHandler::new(
        "invoice.payment_failed",
        WebhookAction::NotifyPaymentFailure,
        Severity::Warn,
    ),
];

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran and reported an action.
    Handled {
        event_type: String,
        action: WebhookAction,
    },
    /// No handler is registered for the event type.
    Unhandled { event_type: String },
    /// The handler returned an error or panicked.
    Failed {
        event_type: String,
        error: WebhookError,
    },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, DispatchOutcome::Failed { .. })
    }
}

/// Routes verified events to handlers keyed by event type.
#[derive(Clone, Default)]
pub struct WebhookDispatcher {
    handlers: HashMap<String, Arc<dyn WebhookEventHandler>>,
}

impl fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("WebhookDispatcher")
            .field("event_types", &types)
            .finish()
    }
}

impl WebhookDispatcher {
    /// Dispatcher with no handlers; every event is unhandled.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dispatcher populated with the standard seven event types.
    pub fn standard() -> Self {
        STANDARD_HANDLERS
            .iter()
            .cloned()
            .fold(Self::empty(), |dispatcher, handler| dispatcher.with_handler(handler))
    }

    /// Registers `handler`, replacing any handler for the same event type.
    pub fn with_handler(mut self, handler: impl WebhookEventHandler + 'static) -> Self {
        self.handlers
            .insert(handler.event_type().to_string(), Arc::new(handler));
        self
    }

    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Dispatches a verified event. Never fails.
    pub async fn dispatch(&self, event: &WebhookEvent) -> DispatchOutcome {
        let event_type = event.event_type.clone();

        let Some(handler) = self.handlers.get(&event_type) else {
            tracing::info!(
                event_id = %event.id,
                event_type = %event_type,
                "Webhook event type not handled"
            );
            return DispatchOutcome::Unhandled { event_type };
        };

        match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
            Ok(Ok(action)) => DispatchOutcome::Handled { event_type, action },
            Ok(Err(error)) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event_type,
                    error = %error,
                    "Webhook handler failed"
                );
                DispatchOutcome::Failed { event_type, error }
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event_type,
                    panic = %message,
                    "Webhook handler panicked"
                );
                DispatchOutcome::Failed {
                    event_type,
                    error: WebhookError::HandlerFailed(message),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::webhook_event::WebhookEventBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WebhookEventHandler for CountingHandler {
        fn event_type(&self) -> &str {
            "payment_intent.succeeded"
        }

        async fn handle(&self, _event: &WebhookEvent) -> Result<WebhookAction, WebhookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(WebhookAction::ActivateService)
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl WebhookEventHandler for PanickingHandler {
        fn event_type(&self) -> &str {
            "invoice.payment_failed"
        }

        async fn handle(&self, _event: &WebhookEvent) -> Result<WebhookAction, WebhookError> {
            panic!("downstream exploded");
        }
    }

    #[tokio::test]
    async fn standard_table_maps_every_type_to_its_action() {
        let dispatcher = WebhookDispatcher::standard();
        let cases = [
            ("payment_intent.succeeded", WebhookAction::ActivateService),
            ("payment_intent.payment_failed", WebhookAction::SuspendService),
            ("customer.subscription.created", WebhookAction::ProvisionResources),
            ("customer.subscription.updated", WebhookAction::UpdateResources),
            ("customer.subscription.deleted", WebhookAction::DeprovisionResources),
            ("invoice.payment_succeeded", WebhookAction::ExtendSubscription),
            ("invoice.payment_failed", WebhookAction::NotifyPaymentFailure),
        ];

        for (event_type, expected) in cases {
            let event = WebhookEventBuilder::new(event_type).build();
            let outcome = dispatcher.dispatch(&event).await;
            assert_eq!(
                outcome,
                DispatchOutcome::Handled {
                    event_type: event_type.to_string(),
                    action: expected,
                },
                "wrong outcome for {}",
                event_type
            );
        }
    }

    #[tokio::test]
    async fn unknown_type_is_unhandled_not_failed() {
        let dispatcher = WebhookDispatcher::standard();
        let event = WebhookEventBuilder::new("charge.dispute.created").build();

        let outcome = dispatcher.dispatch(&event).await;

        assert!(outcome.is_success());
        assert_eq!(
            outcome,
            DispatchOutcome::Unhandled {
                event_type: "charge.dispute.created".to_string()
            }
        );
    }

    #[tokio::test]
    async fn object_without_id_reports_failure() {
        let dispatcher = WebhookDispatcher::standard();
        let event = WebhookEventBuilder::new("payment_intent.succeeded")
            .object(serde_json::json!({"amount": 4900}))
            .build();

        let outcome = dispatcher.dispatch(&event).await;

        assert!(!outcome.is_success());
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed {
                error: WebhookError::MissingField("id"),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn panicking_handler_is_caught() {
        let dispatcher = WebhookDispatcher::standard().with_handler(PanickingHandler);
        let event = WebhookEventBuilder::new("invoice.payment_failed").build();

        let outcome = dispatcher.dispatch(&event).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                event_type: "invoice.payment_failed".to_string(),
                error: WebhookError::HandlerFailed("downstream exploded".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn redelivered_event_runs_handler_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = WebhookDispatcher::empty().with_handler(CountingHandler {
            calls: calls.clone(),
        });
        let event = WebhookEventBuilder::new("payment_intent.succeeded")
            .id("evt_dup")
            .build();

        dispatcher.dispatch(&event).await;
        dispatcher.dispatch(&event).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn with_handler_replaces_existing_registration() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = WebhookDispatcher::standard().with_handler(CountingHandler { calls });

        assert!(dispatcher.handles("payment_intent.succeeded"));
        assert_eq!(dispatcher.handlers.len(), 7);
    }

    #[test]
    fn empty_dispatcher_handles_nothing() {
        assert!(!WebhookDispatcher::empty().handles("payment_intent.succeeded"));
    }

    #[test]
    fn action_serializes_snake_case() {
        let json = serde_json::to_string(&WebhookAction::NotifyPaymentFailure).unwrap();
        assert_eq!(json, "\"notify_payment_failure\"");
        assert_eq!(WebhookAction::ActivateService.to_string(), "activate_service");
    }
}
